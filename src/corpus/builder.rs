use std::{
    collections::HashSet,
    fs::File,
    io::{
        BufRead,
        BufReader,
    },
    path::{
        Path,
        PathBuf,
    },
};

use super::FrequencyList;
use crate::core::{
    utils::normalize_reading,
    WaniWordsError,
};

pub const DEFAULT_BLACKLISTED_POS: &[&str] = &["助詞", "助動詞", "接尾辞", "数詞", "固有名詞"];
/// Separators and brackets from compound or annotated lemmas. `・` is not here: the kana
/// table treats it as readable, so words like `テレビ・ゲーム` stay in the corpus.
pub const DEFAULT_BLACKLISTED_SYMBOLS: &[char] = &['＝', '／', '｜', '（', '）'];

/// Which field of a delimited line holds what.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub lemma: usize,
    pub reading: usize,
    pub part_of_speech: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusSource {
    pub path: PathBuf,
    pub delimiter: char,
    pub columns: ColumnMap,
}

impl CorpusSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: char, columns: ColumnMap) -> Self {
        Self { path: path.into(), delimiter, columns }
    }

    /// BCCWJ short-unit-word list: `rank, lForm (reading), lemma, pos, ...`
    pub fn bccwj_suw(path: impl Into<PathBuf>) -> Self {
        Self::new(path, '\t', ColumnMap { lemma: 2, reading: 1, part_of_speech: 3 })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CorpusEntry {
    lemma: String,
    reading: String,
    part_of_speech: String,
}

#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Matched by containment, so `固有名詞` also catches `名詞-固有名詞-人名`.
    pub blacklisted_pos: Vec<String>,
    pub blacklisted_symbols: Vec<char>,
    /// Raw lines read per source, header included.
    pub max_lines: Option<usize>,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            blacklisted_pos: DEFAULT_BLACKLISTED_POS.iter().map(|s| s.to_string()).collect(),
            blacklisted_symbols: DEFAULT_BLACKLISTED_SYMBOLS.to_vec(),
            max_lines: None,
        }
    }
}

pub struct CorpusBuilder {
    config: CorpusConfig,
}

impl CorpusBuilder {
    pub fn new(config: CorpusConfig) -> Self {
        Self { config }
    }

    /// Builds the frequency list from `primary`, dropping every entry that the optional
    /// `refinement` corpus tags with a blacklisted part of speech.
    ///
    /// The first emitted entry is always discarded: both supported formats open with a
    /// header line that would otherwise survive the filters.
    pub fn build(
        &self,
        primary: &CorpusSource,
        refinement: Option<&CorpusSource>,
    ) -> Result<FrequencyList, WaniWordsError> {
        let refinement_blacklist = match refinement {
            Some(source) => self.refinement_blacklist(source)?,
            None => HashSet::new(),
        };

        let mut emitted = Vec::new();
        let mut skipped = 0usize;
        self.for_each_entry(primary, |entry| {
            if !self.is_eligible(&entry) {
                skipped += 1;
                return;
            }
            if refinement_blacklist.contains(&(entry.lemma.clone(), normalize_reading(&entry.reading)))
            {
                skipped += 1;
                return;
            }
            emitted.push(entry.lemma);
        })?;

        let mut seen = HashSet::new();
        let words: Vec<String> =
            emitted.into_iter().skip(1).filter(|word| seen.insert(word.clone())).collect();

        tracing::info!(
            "Built frequency list from {}: {} words ({} lines skipped)",
            primary.path.display(),
            words.len(),
            skipped
        );
        Ok(FrequencyList::new(words))
    }

    /// `(lemma, reading)` pairs the refining corpus classifies under a blacklisted tag.
    fn refinement_blacklist(
        &self,
        source: &CorpusSource,
    ) -> Result<HashSet<(String, String)>, WaniWordsError> {
        let mut blacklist = HashSet::new();
        self.for_each_entry(source, |entry| {
            if self.has_blacklisted_pos(&entry.part_of_speech) && !entry.lemma.is_empty() {
                blacklist.insert((entry.lemma, normalize_reading(&entry.reading)));
            }
        })?;
        tracing::info!(
            "Refinement corpus {} blacklists {} lemma/reading pairs",
            source.path.display(),
            blacklist.len()
        );
        Ok(blacklist)
    }

    fn is_eligible(&self, entry: &CorpusEntry) -> bool {
        !entry.lemma.is_empty()
            && !self.has_blacklisted_pos(&entry.part_of_speech)
            && !entry.lemma.chars().any(|c| self.config.blacklisted_symbols.contains(&c))
    }

    fn has_blacklisted_pos(&self, tag: &str) -> bool {
        self.config.blacklisted_pos.iter().any(|pos| tag.contains(pos.as_str()))
    }

    fn for_each_entry(
        &self,
        source: &CorpusSource,
        mut visit: impl FnMut(CorpusEntry),
    ) -> Result<(), WaniWordsError> {
        let file = open_source(&source.path)?;
        let budget = self.config.max_lines.unwrap_or(usize::MAX);

        for (index, line) in BufReader::new(file).lines().enumerate() {
            if index >= budget {
                tracing::debug!(
                    "Line budget of {} reached for {}",
                    budget,
                    source.path.display()
                );
                break;
            }
            let line = line.map_err(|e| corpus_error(&source.path, e))?;
            visit(parse_line(&line, source));
        }
        Ok(())
    }
}

fn open_source(path: &Path) -> Result<File, WaniWordsError> {
    File::open(path).map_err(|e| corpus_error(path, e))
}

fn corpus_error(path: &Path, source: std::io::Error) -> WaniWordsError {
    WaniWordsError::CorpusSource { path: path.to_path_buf(), source }
}

/// Missing fields come back empty, which the eligibility check rejects.
fn parse_line(line: &str, source: &CorpusSource) -> CorpusEntry {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split(source.delimiter).collect();
    let field = |idx: usize| fields.get(idx).map(|f| f.trim().to_string()).unwrap_or_default();

    CorpusEntry {
        lemma: field(source.columns.lemma),
        reading: field(source.columns.reading),
        part_of_speech: field(source.columns.part_of_speech),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::core::utils::KanaTable;

    const BCCWJ_SAMPLE: &str = "rank\tlForm\tlemma\tpos\tfrequency\n\
        1\tノ\tの\t助詞-格助詞\t5061558\n\
        2\tスル\t為る\t動詞-非自立可能\t3605292\n\
        3\tイウ\t言う\t動詞-一般\t1129016\n\
        4\tトウキョウ\t東京\t名詞-固有名詞-地名-一般\t402222\n\
        5\tコト\t事\t名詞-普通名詞-一般\t1094651\n\
        6\tイチ\t一\t名詞-数詞\t1065213\n\
        7\tイウ\t言う\t動詞-一般\t3121\n\
        8\tオンオフ\tオン／オフ\t名詞-普通名詞-一般\t1000\n\
        9\tヒト\t人\t名詞-普通名詞-一般\t700000\n";

    fn write_source(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_build_filters_and_dedups() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "suw.tsv", BCCWJ_SAMPLE);

        let list = CorpusBuilder::new(CorpusConfig::default())
            .build(&CorpusSource::bccwj_suw(&path), None)
            .unwrap();

        // Header dropped, particles/numerals/proper nouns/symbol lemmas removed, 言う kept once
        assert_eq!(list.words(), &["為る", "言う", "事", "人"]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "suw.tsv", BCCWJ_SAMPLE);
        let builder = CorpusBuilder::new(CorpusConfig::default());
        let source = CorpusSource::bccwj_suw(&path);

        let first = builder.build(&source, None).unwrap();
        let second = builder.build(&source, None).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_emitted_entry_dropped_without_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(
            dir.path(),
            "words.csv",
            "猫,ねこ,名詞\nは,は,助詞\n犬,いぬ,名詞\n",
        );
        let source =
            CorpusSource::new(&path, ',', ColumnMap { lemma: 0, reading: 1, part_of_speech: 2 });

        let list = CorpusBuilder::new(CorpusConfig::default()).build(&source, None).unwrap();
        assert_eq!(list.words(), &["犬"]);
    }

    #[test]
    fn test_line_budget() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(dir.path(), "suw.tsv", BCCWJ_SAMPLE);
        let config = CorpusConfig { max_lines: Some(4), ..CorpusConfig::default() };

        let list =
            CorpusBuilder::new(config).build(&CorpusSource::bccwj_suw(&path), None).unwrap();
        // Header, の, 為る, 言う read; header emitted then dropped
        assert_eq!(list.words(), &["為る", "言う"]);
    }

    #[test]
    fn test_refinement_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let primary = write_source(dir.path(), "suw.tsv", BCCWJ_SAMPLE);
        // Second corpus tags 事 (reading こと) as a suffix, and 人 only under another reading
        let refinement = write_source(
            dir.path(),
            "refine.csv",
            "lemma,reading,pos\n事,こと,接尾辞\n人,にん,接尾辞\n人,ひと,名詞\n",
        );
        let refinement =
            CorpusSource::new(refinement, ',', ColumnMap { lemma: 0, reading: 1, part_of_speech: 2 });

        let list = CorpusBuilder::new(CorpusConfig::default())
            .build(&CorpusSource::bccwj_suw(&primary), Some(&refinement))
            .unwrap();
        assert_eq!(list.words(), &["為る", "言う", "人"]);
    }

    #[test]
    fn test_missing_source_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = CorpusSource::bccwj_suw(dir.path().join("nope.tsv"));
        let builder = CorpusBuilder::new(CorpusConfig::default());

        let err = builder.build(&missing, None).unwrap_err();
        assert!(matches!(err, WaniWordsError::CorpusSource { .. }));

        let primary = write_source(dir.path(), "suw.tsv", BCCWJ_SAMPLE);
        let err = builder.build(&CorpusSource::bccwj_suw(primary), Some(&missing)).unwrap_err();
        assert!(matches!(err, WaniWordsError::CorpusSource { .. }));
    }

    #[test]
    fn test_short_lines_skipped() {
        let source = CorpusSource::bccwj_suw("unused");
        let entry = parse_line("1\tネコ", &source);
        assert!(entry.lemma.is_empty());

        let builder = CorpusBuilder::new(CorpusConfig::default());
        assert!(!builder.is_eligible(&entry));
    }

    #[test]
    fn test_middle_dot_words_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_source(
            dir.path(),
            "suw.tsv",
            "rank\tlForm\tlemma\tpos\tfrequency\n\
             1\tテレビゲーム\tテレビ・ゲーム\t名詞-普通名詞-一般\t1000\n\
             2\tオンオフ\tオン／オフ\t名詞-普通名詞-一般\t900\n",
        );

        let list = CorpusBuilder::new(CorpusConfig::default())
            .build(&CorpusSource::bccwj_suw(&path), None)
            .unwrap();

        assert_eq!(list.words(), &["テレビ・ゲーム"]);
        assert!(KanaTable::default().is_kana_only("テレビ・ゲーム"));
    }
}
