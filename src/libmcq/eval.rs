use crate::libmcq::data::{load_mcq_data, load_responses, QuestionRecord};
use crate::libmcq::model::{
    AnswerSource, CommandModel, ModelError, RandomBaseline, ReplayModel, UnconfiguredModel,
};
use crate::libmcq::output::save_results_txt;
use crate::libmcq::parse::{parse_response_detailed, Choice};
use crate::libmcq::resolve::{extract_index, find_image_path};
use crate::libmcq::Error;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

macro_rules! extract_or_skip {
    ($field:expr, $counter:expr, $warn_msg:expr $(, $args:expr)*) => {
        match $field {
            None => {
                warn!($warn_msg $(, $args)*);
                $counter += 1;
                continue;
            }
            Some(value) => value,
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalResult {
    pub index: u64,
    pub lenient_option: Choice,
    pub answer_num: u8,
}

impl EvalResult {
    pub fn new(index: u64, choice: Choice) -> Self {
        Self {
            index,
            lenient_option: choice,
            answer_num: choice.as_number(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvalSummary {
    pub total: usize,
    pub written: usize,
    pub missing_name: usize,
    pub no_index: usize,
    pub image_not_found: usize,
    /// Records forced to `D` because the source failed or answered nothing usable.
    pub inference_failures: usize,
    pub distribution: BTreeMap<Choice, usize>,
}

impl EvalSummary {
    pub fn skipped(&self) -> usize {
        self.missing_name + self.no_index + self.image_not_found
    }
}

#[derive(Debug, Clone, Default)]
pub struct EvalOutcome {
    pub results: Vec<EvalResult>,
    pub summary: EvalSummary,
}

fn infer(source: &mut dyn AnswerSource, image: &Path, prompt: &str) -> Result<Choice, ModelError> {
    let raw = source.answer(image, prompt)?;
    if raw.trim().is_empty() {
        return Err(ModelError::EmptyResponse);
    }
    if raw.starts_with("ERROR") {
        return Err(ModelError::ErrorResponse(raw));
    }
    let parsed = parse_response_detailed(Some(&raw));
    debug!(
        "[Eval] {:?} -> {} (pattern {:?})",
        raw, parsed.choice, parsed.rule
    );
    Ok(parsed.choice)
}

/// Runs every record through `source` and returns results sorted by index.
///
/// Records without a usable image name, index or image file are skipped.
/// Every other record yields exactly one result; failures become `D`.
pub fn evaluate_mcq<P: AsRef<Path>>(
    records: &[QuestionRecord],
    image_dirs: &[P],
    source: &mut dyn AnswerSource,
) -> EvalOutcome {
    let now = Instant::now();
    let mut summary = EvalSummary {
        total: records.len(),
        ..Default::default()
    };
    let mut results = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let image_name = record.image_name();
        let image_name = extract_or_skip!(
            (!image_name.is_empty()).then_some(image_name),
            summary.missing_name,
            "[Eval] Record {} has no `image_name`! Skipping...",
            i
        );
        let index = extract_or_skip!(
            extract_index(image_name),
            summary.no_index,
            "[Eval] Cannot extract an index from {:?}! Skipping...",
            image_name
        );
        let image_path = extract_or_skip!(
            find_image_path(image_name, image_dirs),
            summary.image_not_found,
            "[Eval] Image {:?} not found in any directory! Skipping...",
            image_name
        );

        let choice = match infer(source, &image_path, &record.prompt()) {
            Ok(choice) => choice,
            Err(err) => {
                warn!("[Eval] {} ({}): {}. Defaulting to D.", index, image_name, err);
                summary.inference_failures += 1;
                Choice::D
            }
        };

        *summary.distribution.entry(choice).or_insert(0) += 1;
        results.push(EvalResult::new(index, choice));
    }

    results.sort_by_key(|r| r.index);
    summary.written = results.len();

    info!(
        "[Eval] {} of {} records answered by `{}` in {} ms.",
        summary.written,
        summary.total,
        source.name(),
        now.elapsed().as_millis()
    );
    EvalOutcome { results, summary }
}

/// Where answers come from for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceConfig {
    Random { seed: Option<u64> },
    Replay(PathBuf),
    Command(PathBuf),
    Unconfigured,
}

impl SourceConfig {
    pub fn build(&self) -> Result<Box<dyn AnswerSource>, Error> {
        Ok(match self {
            SourceConfig::Random { seed } => Box::new(RandomBaseline::new(*seed)),
            SourceConfig::Replay(path) => Box::new(ReplayModel::new(load_responses(path)?)),
            SourceConfig::Command(program) => Box::new(CommandModel::new(program.clone())),
            SourceConfig::Unconfigured => Box::new(UnconfiguredModel),
        })
    }
}

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub mcq_data: PathBuf,
    pub image_dirs: Vec<PathBuf>,
    pub output: PathBuf,
    pub source: SourceConfig,
}

/// Load, evaluate, save.
pub fn run(config: &EvalConfig) -> Result<EvalOutcome, Error> {
    let records = load_mcq_data(&config.mcq_data)?;
    let mut source = config.source.build()?;
    if config.source == SourceConfig::Unconfigured {
        warn!("[Eval] No model configured; every answer will default to D.");
    }
    let outcome = evaluate_mcq(&records, config.image_dirs.as_slice(), source.as_mut());
    save_results_txt(&outcome.results, &config.output)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    struct Scripted(Vec<Result<String, ModelError>>);

    impl AnswerSource for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn answer(&mut self, _image: &Path, _prompt: &str) -> Result<String, ModelError> {
            self.0.remove(0)
        }
    }

    fn image_dir(names: &[&str]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            File::create(dir.path().join(name)).unwrap();
        }
        dir
    }

    #[test]
    fn results_are_sorted_by_index() {
        let dir = image_dir(&["10.jpg", "2.jpg", "7.jpg"]);
        let records = [
            QuestionRecord::new("10.jpg", "q", "o"),
            QuestionRecord::new("2.jpg", "q", "o"),
            QuestionRecord::new("7.jpg", "q", "o"),
        ];
        let mut source = Scripted(vec![
            Ok("Answer: [A]".into()),
            Ok("[B]".into()),
            Ok("The answer is C".into()),
        ]);
        let outcome = evaluate_mcq(&records, &[dir.path()], &mut source);
        assert_eq!(
            outcome.results,
            vec![
                EvalResult::new(2, Choice::B),
                EvalResult::new(7, Choice::C),
                EvalResult::new(10, Choice::A),
            ]
        );
    }

    #[test]
    fn failures_become_d() {
        let dir = image_dir(&["0.jpg", "1.jpg", "2.jpg", "3.jpg"]);
        let records: Vec<_> = ["0.jpg", "1.jpg", "2.jpg", "3.jpg"]
            .iter()
            .map(|n| QuestionRecord::new(n, "q", "o"))
            .collect();
        let mut source = Scripted(vec![
            Err(ModelError::Unavailable),
            Ok(String::new()),
            Ok("ERROR: [A] timed out".into()),
            Ok("no idea".into()),
        ]);
        let outcome = evaluate_mcq(&records, &[dir.path()], &mut source);
        assert_eq!(outcome.results.len(), 4);
        assert!(outcome
            .results
            .iter()
            .all(|r| r.lenient_option == Choice::D && r.answer_num == 3));
        assert_eq!(outcome.summary.inference_failures, 3);
        assert_eq!(outcome.summary.distribution.get(&Choice::D), Some(&4));
    }

    #[test]
    fn unusable_records_are_skipped() {
        let dir = image_dir(&["abc.jpg", "5.jpg"]);
        let records = [
            QuestionRecord::default(),
            QuestionRecord::new("abc.jpg", "q", "o"),
            QuestionRecord::new("6.jpg", "q", "o"),
            QuestionRecord::new("5.jpg", "q", "o"),
        ];
        let mut source = Scripted(vec![Ok("[C]".into())]);
        let outcome = evaluate_mcq(&records, &[dir.path()], &mut source);
        assert_eq!(outcome.results, vec![EvalResult::new(5, Choice::C)]);
        assert_eq!(outcome.summary.missing_name, 1);
        assert_eq!(outcome.summary.no_index, 1);
        assert_eq!(outcome.summary.image_not_found, 1);
        assert_eq!(outcome.summary.skipped(), 3);
        assert_eq!(outcome.summary.written, 1);
    }

    #[test]
    fn duplicate_indices_keep_input_order() {
        let first = image_dir(&["4.jpg"]);
        let second = image_dir(&["4.png"]);
        let records = [
            QuestionRecord::new("4.jpg", "q", "o"),
            QuestionRecord::new("4.png", "q", "o"),
        ];
        let mut source = Scripted(vec![Ok("[A]".into()), Ok("[B]".into())]);
        let outcome = evaluate_mcq(&records, &[first.path(), second.path()], &mut source);
        let letters: Vec<_> = outcome.results.iter().map(|r| r.lenient_option).collect();
        assert_eq!(letters, vec![Choice::A, Choice::B]);
    }

    #[test]
    fn prompt_reaches_the_source() {
        struct Capture(Vec<String>);
        impl AnswerSource for Capture {
            fn name(&self) -> &str {
                "capture"
            }
            fn answer(&mut self, _image: &Path, prompt: &str) -> Result<String, ModelError> {
                self.0.push(prompt.to_string());
                Ok("A".into())
            }
        }
        let dir = image_dir(&["0.jpg"]);
        let records = [QuestionRecord::new("0.jpg", "  Which?", "A. x\nB. y  ")];
        let mut source = Capture(Vec::new());
        evaluate_mcq(&records, &[dir.path()], &mut source);
        assert_eq!(source.0, vec!["Which?\nA. x\nB. y".to_string()]);
    }
}
