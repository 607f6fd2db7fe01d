use anyhow::{bail, Result};
use tracing::debug;

use super::{
    describe::describe,
    embedding::{cosine_similarity, embed_query, Embedder},
};
use crate::wardrobe::repo_types::WardrobeItem;

struct IndexEntry {
    item_id: i64,
    text: String,
    vector: Vec<f32>,
}

/// Ephemeral semantic index over one user's wardrobe.
///
/// Owned by the request that builds it; nothing is shared across requests.
pub struct WardrobeIndex {
    collection: String,
    entries: Vec<IndexEntry>,
}

impl WardrobeIndex {
    pub fn new(user_id: i64) -> Self {
        Self {
            collection: format!("user_{user_id}_wardrobe"),
            entries: Vec::new(),
        }
    }

    #[cfg(test)]
    fn collection(&self) -> &str {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Add one document. Ids are unique within an index.
    pub fn insert(&mut self, item_id: i64, text: String, vector: Vec<f32>) -> Result<()> {
        if self.entries.iter().any(|e| e.item_id == item_id) {
            bail!("item {item_id} already indexed in {}", self.collection);
        }
        self.entries.push(IndexEntry { item_id, text, vector });
        Ok(())
    }

    /// Replace the index contents with `items`, each stored under its own id
    /// with its [`describe`] text.
    pub async fn rebuild(&mut self, embedder: &dyn Embedder, items: &[WardrobeItem]) -> Result<()> {
        self.clear();
        let texts: Vec<String> = items.iter().map(describe).collect();
        let vectors = embedder.embed(&texts).await?;
        if vectors.len() != texts.len() {
            bail!("embedder returned {} vectors for {} items", vectors.len(), texts.len());
        }
        for ((item, text), vector) in items.iter().zip(texts).zip(vectors) {
            self.insert(item.id, text, vector)?;
        }
        debug!(collection = %self.collection, count = self.len(), model = embedder.model_name(), "index built");
        Ok(())
    }

    /// Descriptions ranked by descending similarity to `text`.
    ///
    /// `top_n` is clamped to the number of entries; equal scores keep
    /// insertion order.
    pub async fn query(&self, embedder: &dyn Embedder, text: &str, top_n: usize) -> Result<Vec<String>> {
        let n = top_n.min(self.entries.len());
        if n == 0 {
            return Ok(Vec::new());
        }
        let q = embed_query(embedder, text).await?;

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|e| (cosine_similarity(&q, &e.vector), e))
            .collect();
        // stable sort keeps insertion order for ties
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored.into_iter().take(n).map(|(_, e)| e.text.clone()).collect())
    }
}

/// Create a fresh index for `user_id` populated from `items`.
pub async fn build_index(
    embedder: &dyn Embedder,
    user_id: i64,
    items: &[WardrobeItem],
) -> Result<WardrobeIndex> {
    let mut index = WardrobeIndex::new(user_id);
    index.rebuild(embedder, items).await?;
    Ok(index)
}
