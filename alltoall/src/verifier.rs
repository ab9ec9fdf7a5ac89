use std::ops::Range;

use crate::{expected_output_index, ChunkLayout, Element};

/// Number of elements sampled from each end of the output
pub const SAMPLE_LEN: usize = 4;

/// The first and last few elements of an output buffer
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub numel: usize,
    pub first: Vec<T>,
    pub last: Vec<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch<T> {
    pub offset: usize,
    pub expected: T,
    pub actual: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verification<T> {
    pub sample: Sample<T>,
    pub expected_numel: usize,
    pub mismatches: Vec<Mismatch<T>>,
}

impl<T> Verification<T> {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.sample.numel == self.expected_numel && self.mismatches.is_empty()
    }
}

/// Spot-checks an output buffer.
///
/// Only the sampled offsets are compared, which keeps the cost independent of the payload size.
/// Misplaced chunks, a wrong buffer size and stale data all show up at the ends of the buffer.
#[derive(Debug, Clone)]
pub struct Verifier {
    rank: usize,
    layout: ChunkLayout,
    sample_len: usize,
}

impl Verifier {
    pub fn new(rank: usize, layout: ChunkLayout) -> Self {
        Self {
            rank,
            layout,
            sample_len: SAMPLE_LEN,
        }
    }

    pub fn with_sample_len(mut self, sample_len: usize) -> Self {
        self.sample_len = sample_len;
        self
    }

    #[inline]
    fn head(&self, numel: usize) -> Range<usize> {
        0..self.sample_len.min(numel)
    }

    #[inline]
    fn tail(&self, numel: usize) -> Range<usize> {
        numel - self.sample_len.min(numel)..numel
    }

    pub fn sample<T: Element>(&self, output: &[T]) -> Sample<T> {
        let numel = output.len();
        Sample {
            numel,
            first: output[self.head(numel)].to_vec(),
            last: output[self.tail(numel)].to_vec(),
        }
    }

    pub fn verify<T: Element>(&self, output: &[T]) -> Verification<T> {
        let sample = self.sample(output);
        let expected_numel = self.layout.total_elems();

        let mut mismatches = Vec::new();
        if output.len() == expected_numel {
            // head and tail overlap on short buffers
            let mut offsets = self
                .head(expected_numel)
                .chain(self.tail(expected_numel))
                .collect::<Vec<_>>();
            offsets.sort_unstable();
            offsets.dedup();

            for offset in offsets {
                let expected =
                    T::from_index(expected_output_index(self.rank, offset, &self.layout));
                let actual = output[offset];
                if actual != expected {
                    mismatches.push(Mismatch {
                        offset,
                        expected,
                        actual,
                    });
                }
            }
        }

        Verification {
            sample,
            expected_numel,
            mismatches,
        }
    }
}
