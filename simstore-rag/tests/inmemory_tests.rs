//! Property tests for the in-memory vector store and content identifiers.

use std::collections::HashSet;

use proptest::prelude::*;
use simstore_rag::{InMemoryVectorStore, StoredDocument, VectorStore, content_id, is_content_id};

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

/// Generate a document whose id is derived from its text.
fn arb_document(dim: usize) -> impl Strategy<Value = StoredDocument> {
    ("[a-z ]{1,30}", arb_normalized_embedding(dim)).prop_map(|(text, vector)| StoredDocument::new(text, vector))
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

mod prop_inmemory_store {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Query results are ordered by descending score and bounded by top_k.
        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            docs in proptest::collection::vec(arb_document(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let unique: HashSet<&str> = docs.iter().map(|d| d.id.as_str()).collect();
            let unique_count = unique.len();

            let results = runtime().block_on(async {
                let store = InMemoryVectorStore::with_dimensions(DIM);
                store.upsert(&docs).await.unwrap();
                store.query(&query, top_k).await.unwrap()
            });

            prop_assert!(results.len() <= top_k);
            prop_assert_eq!(results.len(), top_k.min(unique_count));
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }

        /// Upserting documents again, in any order, never grows the store.
        #[test]
        fn repeated_upserts_are_idempotent(
            docs in proptest::collection::vec(arb_document(DIM), 1..12),
        ) {
            let unique_count = docs.iter().map(|d| d.id.clone()).collect::<HashSet<_>>().len();

            let len = runtime().block_on(async {
                let store = InMemoryVectorStore::with_dimensions(DIM);
                store.upsert(&docs).await.unwrap();
                let mut reversed = docs.clone();
                reversed.reverse();
                store.upsert(&reversed).await.unwrap();
                store.len().await
            });

            prop_assert_eq!(len, unique_count);
        }
    }
}

mod prop_content_id {
    use super::*;

    proptest! {
        /// Identifiers are deterministic and always 40 lowercase hex digits.
        #[test]
        fn stable_and_well_formed(text in any::<String>()) {
            let id = content_id(&text);
            prop_assert_eq!(&id, &content_id(&text));
            prop_assert!(is_content_id(&id));
        }

        /// Distinct short inputs map to distinct identifiers.
        #[test]
        fn distinct_inputs_distinct_ids(a in "[ -~]{0,32}", b in "[ -~]{0,32}") {
            prop_assume!(a != b);
            prop_assert_ne!(content_id(&a), content_id(&b));
        }
    }
}
