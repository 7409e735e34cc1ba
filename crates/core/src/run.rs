//! 실행 구성 — 태그 필터, 출력 형식, 시나리오 순서 시드, 실패 정책
//!
//! [`RunConfiguration`]은 프로세스 시작 시 한 번 해석되며 실행이 끝날 때까지
//! 변경되지 않습니다.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// 태그 필터 센티널 값
pub const ALL_TAGS: &str = "all";

/// 실행 구성 해석에 쓰이는 원시 입력 (CLI 인자 및 설정에서 수집)
#[derive(Debug, Clone, Default)]
pub struct RunInputs {
    /// 상세 출력 플래그 값 (`"true"`일 때만 pretty 출력)
    pub verbose: Option<String>,
    /// 시나리오 선택자 (태그 표현식)
    pub run: Option<String>,
    /// 고정 시드 (없으면 현재 시각)
    pub seed: Option<u64>,
}

/// 시나리오 태그 필터
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagFilter {
    /// 모든 시나리오 실행
    All,
    /// 불리언 태그 표현식 (`@a and not @b`)
    Expression(String),
}

impl TagFilter {
    /// 시나리오 선택자 인자로부터 필터를 만듭니다.
    ///
    /// 비어 있거나 없거나 정확히 `all`이면 [`TagFilter::All`]입니다.
    /// 그 외의 값은 공백을 포함해 그대로 표현식이 됩니다.
    pub fn from_selector(selector: Option<&str>) -> Self {
        match selector {
            None | Some("") | Some(ALL_TAGS) => Self::All,
            Some(expr) => Self::Expression(expr.to_owned()),
        }
    }

    /// 필터를 사용자에게 보이는 문자열로 반환합니다.
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_TAGS,
            Self::Expression(expr) => expr,
        }
    }

    /// `@`가 없는 태그 이름에 `@`를 붙인 표현식을 반환합니다.
    ///
    /// `didexchange and not (slow)` → `@didexchange and not (@slow)`
    pub fn normalized(&self) -> Option<String> {
        match self {
            Self::All => None,
            Self::Expression(expr) => Some(normalize_tag_expression(expr)),
        }
    }
}

impl fmt::Display for TagFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 시나리오 엔진 출력 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    /// 스텝 단위 상세 출력
    Pretty,
    /// 간결한 진행 출력
    Progress,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Progress => write!(f, "progress"),
        }
    }
}

/// 한 번의 실행에 대한 불변 구성
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfiguration {
    /// 태그 필터
    pub tags: TagFilter,
    /// 출력 형식 (합격/불합격 판정에 영향 없음)
    pub format: OutputFormat,
    /// 시나리오 순서 시드
    pub seed: u64,
    /// 바인딩되지 않았거나 보류된 스텝을 실패로 간주
    pub strict: bool,
    /// 첫 실패 이후 남은 시나리오를 실행하지 않음
    pub stop_on_failure: bool,
}

impl RunConfiguration {
    /// 입력과 현재 시각으로부터 실행 구성을 해석합니다.
    ///
    /// strict 및 stop-on-failure는 이 하네스에서 항상 켜져 있습니다.
    pub fn resolve(inputs: &RunInputs, now: SystemTime) -> Self {
        let format = if inputs.verbose.as_deref() == Some("true") {
            OutputFormat::Pretty
        } else {
            OutputFormat::Progress
        };

        Self {
            tags: TagFilter::from_selector(inputs.run.as_deref()),
            format,
            seed: inputs.seed.unwrap_or_else(|| seed_from_time(now)),
            strict: true,
            stop_on_failure: true,
        }
    }
}

/// 에포크 이후 나노초를 시드로 사용합니다.
pub fn seed_from_time(now: SystemTime) -> u64 {
    let nanos = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    // u64 범위를 넘으면 하위 64비트만 사용
    u64::try_from(nanos).unwrap_or(nanos as u64)
}

fn normalize_tag_expression(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len() + 8);
    let mut word = String::new();

    let flush = |word: &mut String, out: &mut String| {
        if word.is_empty() {
            return;
        }
        let is_operator = matches!(word.as_str(), "and" | "or" | "not");
        if !is_operator && !word.starts_with('@') {
            out.push('@');
        }
        out.push_str(word);
        word.clear();
    };

    for c in expr.chars() {
        if c.is_whitespace() || c == '(' || c == ')' {
            flush(&mut word, &mut out);
            out.push(c);
        } else {
            word.push(c);
        }
    }
    flush(&mut word, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn inputs(verbose: Option<&str>, run: Option<&str>) -> RunInputs {
        RunInputs {
            verbose: verbose.map(str::to_owned),
            run: run.map(str::to_owned),
            seed: None,
        }
    }

    #[test]
    fn missing_selector_means_all() {
        let config = RunConfiguration::resolve(&inputs(None, None), SystemTime::now());
        assert_eq!(config.tags, TagFilter::All);
        assert_eq!(config.tags.as_str(), "all");
    }

    #[test]
    fn empty_selector_means_all() {
        let config = RunConfiguration::resolve(&inputs(None, Some("")), SystemTime::now());
        assert_eq!(config.tags, TagFilter::All);
    }

    #[test]
    fn selector_becomes_filter_verbatim() {
        let config = RunConfiguration::resolve(
            &inputs(None, Some("@didexchange and not @slow")),
            SystemTime::now(),
        );
        assert_eq!(config.tags.as_str(), "@didexchange and not @slow");
    }

    #[test]
    fn selector_is_not_trimmed() {
        let config = RunConfiguration::resolve(&inputs(None, Some(" @smoke ")), SystemTime::now());
        assert_eq!(config.tags, TagFilter::Expression(" @smoke ".to_owned()));

        let padded_all = RunConfiguration::resolve(&inputs(None, Some(" all")), SystemTime::now());
        assert_eq!(padded_all.tags, TagFilter::Expression(" all".to_owned()));
    }

    #[test]
    fn pretty_only_when_verbose_is_exactly_true() {
        let now = SystemTime::now();
        let pretty = RunConfiguration::resolve(&inputs(Some("true"), None), now);
        assert_eq!(pretty.format, OutputFormat::Pretty);

        for value in [None, Some("false"), Some("TRUE"), Some("1"), Some("")] {
            let config = RunConfiguration::resolve(&inputs(value, None), now);
            assert_eq!(config.format, OutputFormat::Progress, "value {value:?}");
        }
    }

    #[test]
    fn seed_comes_from_clock_nanoseconds() {
        let now = UNIX_EPOCH + Duration::new(1_700_000_000, 123);
        let config = RunConfiguration::resolve(&inputs(None, None), now);
        assert_eq!(config.seed, 1_700_000_000_000_000_123);
    }

    #[test]
    fn pinned_seed_wins_over_clock() {
        let mut run_inputs = inputs(None, None);
        run_inputs.seed = Some(7);
        let config = RunConfiguration::resolve(&run_inputs, SystemTime::now());
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn strict_and_stop_on_failure_always_on() {
        let config = RunConfiguration::resolve(&inputs(Some("true"), Some("@x")), SystemTime::now());
        assert!(config.strict);
        assert!(config.stop_on_failure);
    }

    #[test]
    fn normalizes_bare_tags() {
        let filter = TagFilter::Expression("didexchange and not (slow or @flaky)".to_owned());
        assert_eq!(
            filter.normalized().as_deref(),
            Some("@didexchange and not (@slow or @flaky)")
        );
        assert_eq!(TagFilter::All.normalized(), None);
    }
}
