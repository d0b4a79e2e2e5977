fn main() {
    if let Err(err) = djgraph::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
