use mbir_core::index::{IndexBuilder, InvertedIndex};
use mbir_core::tokenizer::{tokenize, Analyzer};
use std::collections::{BTreeMap, HashSet};

const TWEETS: &[(&str, &str)] = &[
    ("29487710328717313", "BBC World Service to cut 650 jobs"),
    ("29487710328717314", "Jobs jobs jobs: the economy needs jobs"),
    ("29487710328717315", "Watching the Super Bowl with friends"),
    ("29487710328717316", "@bbcworld staff cuts announced today #bbc"),
    ("29487710328717317", "the and of to"),
];

#[test]
fn every_added_document_is_indexed_exactly_once() {
    let mut builder = IndexBuilder::new();
    for (i, (id, text)) in TWEETS.iter().enumerate() {
        let doc_id = builder.add_document(id, text);
        assert_eq!(doc_id as usize, i);
        assert_eq!(builder.document_count(), i + 1);
    }
    let index = builder.finish();

    for (i, (id, text)) in TWEETS.iter().enumerate() {
        let doc_id = i as u32;
        let terms = tokenize(text);
        let doc = index.document(doc_id).unwrap();
        assert_eq!(doc.external_id, *id);
        assert_eq!(doc.length as usize, terms.len());

        let mut expected: BTreeMap<&str, u32> = BTreeMap::new();
        for t in &terms {
            *expected.entry(t.as_str()).or_default() += 1;
        }
        for (term, tf) in expected {
            let hits: Vec<_> = index.postings_for(term).iter().filter(|p| p.doc_id == doc_id).collect();
            assert_eq!(hits.len(), 1, "term {term} in doc {doc_id}");
            assert_eq!(hits[0].term_frequency, tf);
        }
    }
}

#[test]
fn postings_are_sorted_and_reference_known_documents() {
    let index = InvertedIndex::from_documents(Analyzer::default(), TWEETS.iter().copied());
    let mut covered = HashSet::new();
    for term in index.terms() {
        let postings = index.postings_for(term);
        assert!(!postings.is_empty());
        assert!(postings.windows(2).all(|w| w[0].doc_id < w[1].doc_id));
        for p in postings {
            assert!(p.term_frequency > 0);
            assert!(index.document(p.doc_id).is_some());
            covered.insert(p.doc_id);
        }
    }
    for doc in index.documents() {
        assert_eq!(doc.length > 0, covered.contains(&doc.doc_id));
    }
}

#[test]
fn collection_statistics() {
    let index = InvertedIndex::from_documents(Analyzer::default(), TWEETS.iter().copied());
    assert_eq!(index.document_count(), 5);
    assert_eq!(index.total_terms_for("jobs"), 5);
    assert_eq!(index.doc_freq("jobs"), 2);
    assert_eq!(index.doc_freq("missing"), 0);
    let lengths: u64 = index.documents().map(|d| u64::from(d.length)).sum();
    assert_eq!(index.total_terms(), lengths);
    assert!((index.average_document_length() - lengths as f64 / 5.0).abs() < 1e-12);
}

#[test]
fn sealed_index_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<InvertedIndex>();
}
