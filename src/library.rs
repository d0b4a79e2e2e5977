use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ir::{Connection, ConnectionKind, Graph, Track};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static ID_STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9-]").unwrap());

const UNKNOWN_TITLE: &str = "Unknown Track";
const UNKNOWN_ARTIST: &str = "Unknown Artist";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store document is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no connection with id `{0}`")]
    UnknownConnection(String),
}

/// Persistence collaborator. The layout and routing code never calls it.
pub trait TrackStore {
    fn list_tracks(&self) -> Result<Vec<Track>, StoreError>;
    fn list_connections(&self) -> Result<Vec<Connection>, StoreError>;
    fn put_track(&mut self, track: Track) -> Result<(), StoreError>;
    fn put_connection(&mut self, connection: Connection) -> Result<(), StoreError>;
    fn delete_connection(&mut self, id: &str) -> Result<(), StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryDocument {
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl LibraryDocument {
    fn put_track(&mut self, track: Track) {
        match self.tracks.iter_mut().find(|existing| existing.id == track.id) {
            Some(existing) => *existing = track,
            None => self.tracks.push(track),
        }
    }

    fn put_connection(&mut self, connection: Connection) {
        match self.connections.iter_mut().find(|existing| existing.id == connection.id) {
            Some(existing) => *existing = connection,
            None => self.connections.push(connection),
        }
    }

    fn delete_connection(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.connections.len();
        self.connections.retain(|conn| conn.id != id);
        if self.connections.len() == before {
            return Err(StoreError::UnknownConnection(id.to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    doc: LibraryDocument,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: LibraryDocument) -> Self {
        Self { doc }
    }
}

impl TrackStore for MemoryStore {
    fn list_tracks(&self) -> Result<Vec<Track>, StoreError> {
        Ok(self.doc.tracks.clone())
    }

    fn list_connections(&self) -> Result<Vec<Connection>, StoreError> {
        Ok(self.doc.connections.clone())
    }

    fn put_track(&mut self, track: Track) -> Result<(), StoreError> {
        self.doc.put_track(track);
        Ok(())
    }

    fn put_connection(&mut self, connection: Connection) -> Result<(), StoreError> {
        self.doc.put_connection(connection);
        Ok(())
    }

    fn delete_connection(&mut self, id: &str) -> Result<(), StoreError> {
        self.doc.delete_connection(id)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.doc = LibraryDocument::default();
        Ok(())
    }
}

/// Whole-document JSON store, rewritten after every mutation.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: LibraryDocument,
}

impl JsonFileStore {
    /// Opens `path`; a missing file is an empty library.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = if path.exists() {
            let reader = BufReader::new(File::open(&path)?);
            serde_json::from_reader(reader)?
        } else {
            LibraryDocument::default()
        };
        Ok(Self { path, doc })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, &self.doc)?;
        Ok(())
    }
}

impl TrackStore for JsonFileStore {
    fn list_tracks(&self) -> Result<Vec<Track>, StoreError> {
        Ok(self.doc.tracks.clone())
    }

    fn list_connections(&self) -> Result<Vec<Connection>, StoreError> {
        Ok(self.doc.connections.clone())
    }

    fn put_track(&mut self, track: Track) -> Result<(), StoreError> {
        self.doc.put_track(track);
        self.flush()
    }

    fn put_connection(&mut self, connection: Connection) -> Result<(), StoreError> {
        self.doc.put_connection(connection);
        self.flush()
    }

    fn delete_connection(&mut self, id: &str) -> Result<(), StoreError> {
        self.doc.delete_connection(id)?;
        self.flush()
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.doc = LibraryDocument::default();
        self.flush()
    }
}

/// Splits `"Title - Artist"` entry text into a track with a slug id.
/// Anything after a second separator is ignored.
pub fn parse_track_input(input: &str) -> Track {
    let mut parts = input.split(" - ");
    let title = parts
        .next()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .unwrap_or(UNKNOWN_TITLE)
        .to_string();
    let artist = parts
        .next()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string();
    let raw = format!("{title}-{artist}").to_lowercase();
    let dashed = WHITESPACE_RE.replace_all(&raw, "-");
    let id = ID_STRIP_RE.replace_all(&dashed, "").into_owned();
    Track { id, title, artist }
}

/// Entry-side operations over a store: find-or-create tracks and record
/// connections between them.
#[derive(Debug)]
pub struct Library<S: TrackStore> {
    store: S,
}

impl<S: TrackStore> Library<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn find_or_create_track(&mut self, input: &str) -> Result<Track, StoreError> {
        let parsed = parse_track_input(input);
        if let Some(existing) = self
            .store
            .list_tracks()?
            .into_iter()
            .find(|track| track.id == parsed.id)
        {
            return Ok(existing);
        }
        tracing::debug!(id = %parsed.id, "creating track");
        self.store.put_track(parsed.clone())?;
        Ok(parsed)
    }

    pub fn add_connection(
        &mut self,
        track_a_input: &str,
        track_b_input: &str,
        kind: ConnectionKind,
    ) -> Result<Connection, StoreError> {
        let track_a = self.find_or_create_track(track_a_input)?;
        let track_b = self.find_or_create_track(track_b_input)?;
        let connection = Connection {
            id: Uuid::new_v4().to_string(),
            kind,
            track_a: track_a.id,
            track_b: track_b.id,
            created_at: Utc::now(),
        };
        self.store.put_connection(connection.clone())?;
        tracing::debug!(id = %connection.id, ?kind, "connection added");
        Ok(connection)
    }

    pub fn delete_connection(&mut self, id: &str) -> Result<(), StoreError> {
        self.store.delete_connection(id)
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.store.clear()
    }

    pub fn graph(&self, now: DateTime<Utc>) -> Result<Graph, StoreError> {
        let tracks = self.store.list_tracks()?;
        let connections = self.store.list_connections()?;
        Ok(Graph::from_library(&tracks, &connections, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_and_artist() {
        let track = parse_track_input("  Strobe - deadmau5 ");
        assert_eq!(track.title, "Strobe");
        assert_eq!(track.artist, "deadmau5");
        assert_eq!(track.id, "strobe-deadmau5");
    }

    #[test]
    fn slug_drops_punctuation_and_collapses_spaces() {
        let track = parse_track_input("Don't   You Worry Child - Swedish House Mafia");
        assert_eq!(track.id, "dont-you-worry-child-swedish-house-mafia");
        let track = parse_track_input("One - Two - Three");
        assert_eq!(track.title, "One");
        assert_eq!(track.artist, "Two");
        assert_eq!(track.id, "one-two");
    }

    #[test]
    fn missing_parts_fall_back_to_unknown() {
        let track = parse_track_input("Solo");
        assert_eq!(track.artist, "Unknown Artist");
        assert_eq!(track.id, "solo-unknown-artist");
        let track = parse_track_input("");
        assert_eq!(track.title, "Unknown Track");
        assert_eq!(track.id, "unknown-track-unknown-artist");
    }

    #[test]
    fn library_reuses_existing_tracks() {
        let mut library = Library::new(MemoryStore::new());
        let first = library
            .add_connection("Strobe - deadmau5", "Opus - Eric Prydz", ConnectionKind::Transition)
            .unwrap();
        library
            .add_connection("strobe -  deadmau5", "Levels - Avicii", ConnectionKind::Mashup)
            .unwrap();
        let tracks = library.store().list_tracks().unwrap();
        assert_eq!(tracks.len(), 3);
        assert_eq!(first.track_a, "strobe-deadmau5");

        let graph = library.graph(Utc::now()).unwrap();
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.nodes[0].degree, 2);
        assert!(graph.edges.iter().all(|edge| edge.recent));
    }

    #[test]
    fn delete_and_clear() {
        let mut library = Library::new(MemoryStore::new());
        let conn = library
            .add_connection("A - X", "B - Y", ConnectionKind::Mashup)
            .unwrap();
        assert!(matches!(
            library.delete_connection("nope"),
            Err(StoreError::UnknownConnection(_))
        ));
        library.delete_connection(&conn.id).unwrap();
        assert!(library.store().list_connections().unwrap().is_empty());
        assert_eq!(library.store().list_tracks().unwrap().len(), 2);
        library.clear_all().unwrap();
        assert!(library.store().list_tracks().unwrap().is_empty());
    }

    #[test]
    fn json_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        let mut library = Library::new(JsonFileStore::open(&path).unwrap());
        let conn = library
            .add_connection("A - X", "B - Y", ConnectionKind::Transition)
            .unwrap();
        drop(library);

        let reopened = JsonFileStore::open(&path).unwrap();
        let connections = reopened.list_connections().unwrap();
        assert_eq!(connections, vec![conn]);
        assert_eq!(reopened.list_tracks().unwrap().len(), 2);
    }

    #[test]
    fn malformed_json_store_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ tracks: ").unwrap();
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
    }
}
