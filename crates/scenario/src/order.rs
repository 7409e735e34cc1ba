//! 시드 기반 시나리오 순서
//!
//! `cucumber`의 기본 파서가 읽은 feature 목록을 경로 순으로 정렬한 뒤,
//! 실행 시드로 초기화한 SplitMix64 스트림으로 feature 순서와 각 feature 안의
//! 시나리오 순서를 섞습니다. 같은 시드는 항상 같은 순서를 만듭니다.
//!
//! ```text
//! seed ──> ShuffleStream ──> feature 순서 ──> feature별 시나리오 순서 (rule 포함)
//! ```

use std::path::Path;

use cucumber::gherkin;
use cucumber::parser::{self, Parser};
use futures::future::FutureExt as _;
use futures::stream::{self, LocalBoxStream, StreamExt as _};

/// SplitMix64 증분 상수
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// 결정적 셔플용 난수 스트림
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleStream {
    state: u64,
}

impl ShuffleStream {
    /// 시드로 스트림을 생성합니다.
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// 다음 64비트 값을 생성합니다.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// `0..bound` 범위의 인덱스를 생성합니다. `bound`는 0보다 커야 합니다.
    fn next_index(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }

    /// Fisher-Yates 셔플
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

/// 시나리오 순서를 시드로 섞는 파서
///
/// 파싱 에러는 순서를 섞지 않고 앞쪽에 그대로 전달합니다.
#[derive(Debug, Clone, Copy)]
pub struct SeededParser {
    seed: u64,
}

impl SeededParser {
    /// 시드로 파서를 생성합니다.
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// 설정된 시드
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl<I: AsRef<Path>> Parser<I> for SeededParser {
    type Cli = <parser::Basic as Parser<I>>::Cli;
    type Output = LocalBoxStream<'static, parser::Result<gherkin::Feature>>;

    fn parse(self, input: I, cli: Self::Cli) -> Self::Output {
        let seed = self.seed;
        parser::Basic::new()
            .parse(input, cli)
            .collect::<Vec<_>>()
            .map(move |parsed| stream::iter(order_features(parsed, seed)))
            .flatten_stream()
            .boxed_local()
    }
}

/// 파싱 결과를 시드 순서로 재배열합니다.
pub fn order_features(
    parsed: Vec<parser::Result<gherkin::Feature>>,
    seed: u64,
) -> Vec<parser::Result<gherkin::Feature>> {
    let mut errors = Vec::new();
    let mut features = Vec::new();
    for item in parsed {
        match item {
            Ok(feature) => features.push(feature),
            Err(e) => errors.push(Err(e)),
        }
    }

    // 파일 시스템 순회 순서에 의존하지 않도록 먼저 정렬
    features.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.name.cmp(&b.name)));

    let mut rng = ShuffleStream::new(seed);
    rng.shuffle(&mut features);
    for feature in &mut features {
        rng.shuffle(&mut feature.scenarios);
        for rule in &mut feature.rules {
            rng.shuffle(&mut rule.scenarios);
        }
    }

    errors.extend(features.into_iter().map(Ok));
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = ShuffleStream::new(42);
        let mut b = ShuffleStream::new(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn splitmix_reference_values() {
        // SplitMix64(0)의 알려진 첫 출력
        let mut rng = ShuffleStream::new(0);
        assert_eq!(rng.next_u64(), 0xE220_A839_7B1D_CDAF);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut items: Vec<u32> = (0..50).collect();
        ShuffleStream::new(7).shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let shuffled = |seed| {
            let mut items: Vec<u32> = (0..20).collect();
            ShuffleStream::new(seed).shuffle(&mut items);
            items
        };
        assert_eq!(shuffled(1), shuffled(1));
        assert_ne!(shuffled(1), shuffled(2));
    }

    #[test]
    fn shuffle_handles_empty_and_single() {
        let mut empty: Vec<u8> = Vec::new();
        ShuffleStream::new(3).shuffle(&mut empty);
        let mut one = vec![9];
        ShuffleStream::new(3).shuffle(&mut one);
        assert_eq!(one, vec![9]);
    }
}
