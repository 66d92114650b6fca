use crate::error::Result;
use crate::index::InvertedIndex;
use crate::report::ReportWriter;
use std::io::Write;

pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// The first `limit` dictionary terms plus the total vocabulary size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularySample {
    pub total_terms: usize,
    pub terms: Vec<String>,
}

impl VocabularySample {
    pub fn from_index(index: &InvertedIndex, limit: usize) -> Self {
        Self {
            total_terms: index.vocabulary_size(),
            terms: index.terms().take(limit).map(str::to_string).collect(),
        }
    }

    pub fn header(&self) -> String { format!("Total Number of Terms: {}", self.total_terms) }

    pub fn write_to<W: Write>(&self, out: &mut ReportWriter<W>) -> Result<()> {
        out.write_line(self.header())?;
        for term in &self.terms {
            out.write_line(term)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::Analyzer;

    #[test]
    fn small_vocabulary_is_not_padded() {
        let idx = InvertedIndex::from_documents(
            Analyzer::default(),
            [("1", "the cat sat"), ("2", "the dog sat"), ("3", "cat dog bird fish")],
        );
        let sample = VocabularySample::from_index(&idx, DEFAULT_SAMPLE_SIZE);
        assert_eq!(sample.terms, vec!["bird", "cat", "dog", "fish", "sat"]);

        let mut w = ReportWriter::new(Vec::new(), "vocab");
        sample.write_to(&mut w).unwrap();
        let text = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(text, "Total Number of Terms: 5\nbird\ncat\ndog\nfish\nsat\n");
    }

    #[test]
    fn limit_truncates_but_total_is_full_size() {
        let idx = InvertedIndex::from_documents(Analyzer::default(), [("1", "a1 b2 c3 d4")]);
        let sample = VocabularySample::from_index(&idx, 2);
        assert_eq!(sample.total_terms, 4);
        assert_eq!(sample.terms, vec!["a1", "b2"]);
    }
}
