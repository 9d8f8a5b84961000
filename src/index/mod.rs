//! Vector index capability: named collections queried by cosine distance

use crate::embedding::cosine_similarity;
use crate::error::{Result, SkillGapError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

/// A nearest-neighbor hit from a collection query.
///
/// `distance` is cosine distance, `similarity = 1 - distance`. Callers keep
/// their own metadata keyed by `id` or `document`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighbor {
    pub id: String,
    pub document: String,
    pub similarity: f32,
    pub distance: f32,
}

/// A persisted nearest-neighbor store over embedding vectors.
///
/// Rebuilding a collection is always delete-then-recreate, never an in-place
/// incremental update, so concurrent readers never observe a partially
/// rebuilt collection.
pub trait VectorIndex: Send + Sync {
    /// Create an empty collection, replacing any existing one of the same name.
    fn create_collection(&self, name: &str) -> Result<()>;

    /// Delete a collection. Idempotent: absence is not an error.
    fn delete_collection(&self, name: &str);

    /// Insert or replace entries by id.
    fn upsert(&self, collection: &str, ids: &[String], documents: &[String], vectors: &[Vec<f32>]) -> Result<()>;

    /// For each query vector, return up to `k` nearest neighbors by cosine
    /// distance, closest first.
    fn query(&self, collection: &str, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<Neighbor>>>;

    /// Number of entries in a collection, or 0 if it does not exist.
    fn count(&self, collection: &str) -> usize;
}

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    document: String,
    vector: Vec<f32>,
}

/// Brute-force in-memory cosine index.
///
/// Good for taxonomies and catalogs in the tens of thousands; collections are
/// swapped wholesale under a write lock.
#[derive(Default)]
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, Vec<Entry>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VectorIndex for InMemoryIndex {
    fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| SkillGapError::Index("index lock poisoned".to_string()))?;
        collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    fn delete_collection(&self, name: &str) {
        if let Ok(mut collections) = self.collections.write() {
            collections.remove(name);
        }
    }

    fn upsert(&self, collection: &str, ids: &[String], documents: &[String], vectors: &[Vec<f32>]) -> Result<()> {
        if ids.len() != documents.len() || ids.len() != vectors.len() {
            return Err(SkillGapError::Index(format!(
                "upsert length mismatch: {} ids, {} documents, {} vectors",
                ids.len(),
                documents.len(),
                vectors.len()
            )));
        }

        let mut collections = self
            .collections
            .write()
            .map_err(|_| SkillGapError::Index("index lock poisoned".to_string()))?;
        let entries = collections
            .get_mut(collection)
            .ok_or_else(|| SkillGapError::Index(format!("unknown collection: {}", collection)))?;

        for ((id, document), vector) in ids.iter().zip(documents.iter()).zip(vectors.iter()) {
            if let Some(existing) = entries.iter_mut().find(|e| &e.id == id) {
                existing.document = document.clone();
                existing.vector = vector.clone();
            } else {
                entries.push(Entry {
                    id: id.clone(),
                    document: document.clone(),
                    vector: vector.clone(),
                });
            }
        }

        Ok(())
    }

    fn query(&self, collection: &str, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<Neighbor>>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| SkillGapError::Index("index lock poisoned".to_string()))?;
        let entries = collections
            .get(collection)
            .ok_or_else(|| SkillGapError::Index(format!("unknown collection: {}", collection)))?;

        let mut results = Vec::with_capacity(queries.len());
        for query in queries {
            let mut neighbors: Vec<Neighbor> = entries
                .iter()
                .map(|e| {
                    let similarity = cosine_similarity(query, &e.vector);
                    Neighbor {
                        id: e.id.clone(),
                        document: e.document.clone(),
                        similarity,
                        distance: 1.0 - similarity,
                    }
                })
                .collect();

            neighbors.sort_by(|a, b| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.document.cmp(&b.document))
            });
            neighbors.truncate(k);
            results.push(neighbors);
        }

        Ok(results)
    }

    fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(collection).map(|e| e.len()))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> InMemoryIndex {
        let index = InMemoryIndex::new();
        index.create_collection("skills").unwrap();
        index
            .upsert(
                "skills",
                &["s1".to_string(), "s2".to_string(), "s3".to_string()],
                &["python".to_string(), "docker".to_string(), "kubernetes".to_string()],
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![0.7, 0.7]],
            )
            .unwrap();
        index
    }

    #[test]
    fn test_query_orders_by_similarity() {
        let index = sample_index();
        let results = index.query("skills", &[vec![1.0, 0.0]], 3).unwrap();
        assert_eq!(results.len(), 1);
        let hits = &results[0];
        assert_eq!(hits[0].document, "python");
        assert!((hits[0].similarity - 1.0).abs() < 1e-5);
        assert!(hits[0].similarity >= hits[1].similarity);
        assert!(hits[1].similarity >= hits[2].similarity);
    }

    #[test]
    fn test_query_truncates_to_k() {
        let index = sample_index();
        let results = index.query("skills", &[vec![1.0, 0.0]], 1).unwrap();
        assert_eq!(results[0].len(), 1);
    }

    #[test]
    fn test_distance_is_one_minus_similarity() {
        let index = sample_index();
        let hits = &index.query("skills", &[vec![0.0, 1.0]], 1).unwrap()[0];
        assert!((hits[0].distance - (1.0 - hits[0].similarity)).abs() < 1e-6);
    }

    #[test]
    fn test_delete_collection_is_idempotent() {
        let index = sample_index();
        index.delete_collection("skills");
        index.delete_collection("skills");
        assert_eq!(index.count("skills"), 0);
    }

    #[test]
    fn test_create_replaces_existing_collection() {
        let index = sample_index();
        assert_eq!(index.count("skills"), 3);
        index.create_collection("skills").unwrap();
        assert_eq!(index.count("skills"), 0);
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let index = sample_index();
        index
            .upsert(
                "skills",
                &["s1".to_string()],
                &["python 3".to_string()],
                &[vec![0.0, 1.0]],
            )
            .unwrap();
        assert_eq!(index.count("skills"), 3);
        let hits = &index.query("skills", &[vec![0.0, 1.0]], 1).unwrap()[0];
        assert!(hits.iter().any(|n| n.id == "s1"));
    }

    #[test]
    fn test_query_unknown_collection_errors() {
        let index = InMemoryIndex::new();
        assert!(index.query("missing", &[vec![1.0]], 1).is_err());
    }
}
