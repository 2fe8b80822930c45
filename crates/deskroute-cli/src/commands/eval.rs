//! `deskroute eval`

use anyhow::Context;
use deskroute_classifiers::{Classifier, EscalationPolicy, TextClassifier};
use deskroute_core::{load_dataset, Result};
use deskroute_router::DeskConfig;
use std::path::Path;

/// A labeled request. `expected` lists every acceptable category.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalCase {
    pub text: String,
    pub expected: Vec<String>,
}

impl EvalCase {
    /// `category` may hold alternatives separated by `/`, e.g. `errors/software`
    pub fn new(text: impl Into<String>, category: &str) -> Self {
        Self {
            text: text.into(),
            expected: category
                .split('/')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn accepts(&self, label: &str) -> bool {
        self.expected.iter().any(|c| c == label)
    }
}

/// Smoke set covering every support category plus one ambiguous request
pub fn builtin_cases() -> Vec<EvalCase> {
    [
        ("Ошибка при входе в систему, не могу авторизоваться", "errors"),
        ("Программа выдает error при попытке сохранения", "errors"),
        ("Проблемы с 1С после обновления, не запускается", "software"),
        ("SAP не подключается к базе данных", "software"),
        ("Прошу оформить заявку на отпуск с 15 по 30 числа", "requests"),
        ("Нужно добавить нового пользователя в систему срочно", "requests"),
        ("Документ на НДС формируется с неправильными данными", "documents"),
        ("Проблема с печатью документов из базы", "documents"),
        ("Не могу войти в систему, пароль не подходит", "access"),
        ("Требуется настроить MFA для учетной записи", "access"),
        ("Не могу оформить заявку на доступ к 1С, выдает ошибку", "errors/software"),
    ]
    .into_iter()
    .map(|(text, category)| EvalCase::new(text, category))
    .collect()
}

/// Outcome of one case
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub case: EvalCase,
    pub predicted: String,
    pub confidence: f32,
    pub correct: bool,
    pub escalated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyBand {
    /// At least 80%
    Excellent,
    /// At least 60%
    Good,
    NeedsImprovement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationBand {
    /// Over 30%: the threshold is likely too strict
    TooHigh,
    /// Under 10%: the threshold is likely too lenient
    TooLow,
    Acceptable,
}

#[derive(Debug, Clone, Default)]
pub struct EvalReport {
    pub results: Vec<CaseResult>,
}

impl EvalReport {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn correct(&self) -> usize {
        self.results.iter().filter(|r| r.correct).count()
    }

    pub fn escalated(&self) -> usize {
        self.results.iter().filter(|r| r.escalated).count()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total())
    }

    pub fn escalation_rate(&self) -> f64 {
        ratio(self.escalated(), self.total())
    }

    pub fn accuracy_band(&self) -> AccuracyBand {
        let accuracy = self.accuracy();
        if accuracy >= 0.8 {
            AccuracyBand::Excellent
        } else if accuracy >= 0.6 {
            AccuracyBand::Good
        } else {
            AccuracyBand::NeedsImprovement
        }
    }

    pub fn escalation_band(&self) -> EscalationBand {
        let rate = self.escalation_rate();
        if rate > 0.3 {
            EscalationBand::TooHigh
        } else if rate < 0.1 {
            EscalationBand::TooLow
        } else {
            EscalationBand::Acceptable
        }
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

/// Classify every case and apply the escalation policy
pub fn evaluate(
    classifier: &dyn Classifier,
    policy: &EscalationPolicy,
    cases: &[EvalCase],
) -> Result<EvalReport> {
    let results = cases
        .iter()
        .map(|case| {
            let result = classifier.classify(&case.text)?;
            Ok(CaseResult {
                correct: case.accepts(&result.label),
                escalated: policy.decide(result.score),
                predicted: result.label,
                confidence: result.score,
                case: case.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(EvalReport { results })
}

/// Evaluate the configured model on `cases_path` or the built-in set
pub fn run(config: &DeskConfig, cases_path: Option<&Path>) -> anyhow::Result<EvalReport> {
    let cases = match cases_path {
        Some(path) => load_dataset(path)
            .with_context(|| format!("failed to load cases {}", path.display()))?
            .into_iter()
            .map(|sample| EvalCase::new(sample.text, &sample.category))
            .collect(),
        None => builtin_cases(),
    };

    let classifier = TextClassifier::load(&config.model_path)?;
    let policy = EscalationPolicy::new(config.escalation.threshold);
    Ok(evaluate(&classifier, &policy, &cases)?)
}

pub fn print(report: &EvalReport) {
    for (idx, result) in report.results.iter().enumerate() {
        println!(
            "{:>3}. [{}] {} -> {} ({:.1}%){}",
            idx + 1,
            if result.correct { "ok" } else { "miss" },
            result.case.text,
            result.predicted,
            result.confidence * 100.0,
            if result.escalated { ", escalated" } else { "" }
        );
    }

    println!();
    println!(
        "Accuracy:        {}/{} ({:.1}%)",
        report.correct(),
        report.total(),
        report.accuracy() * 100.0
    );
    println!(
        "Escalation rate: {}/{} ({:.1}%)",
        report.escalated(),
        report.total(),
        report.escalation_rate() * 100.0
    );

    println!();
    match report.accuracy_band() {
        AccuracyBand::Excellent => println!("Excellent: the model works very well."),
        AccuracyBand::Good => println!("Good: there is room for improvement."),
        AccuracyBand::NeedsImprovement => {
            println!("Needs improvement: add training data, extend the rule table, retrain.")
        }
    }
    match report.escalation_band() {
        EscalationBand::TooHigh => println!("Escalation rate is high; consider lowering the threshold."),
        EscalationBand::TooLow => println!("Escalation rate is low; consider raising the threshold."),
        EscalationBand::Acceptable => println!("Escalation rate is within the expected range."),
    }
}
