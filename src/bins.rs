//! [`Bin`] and [`BinList`], the building blocks of a segment's histogram.

use crate::HistogramError;

//=================
// Bin

/// One response-time range of a histogram and the number of samples that fell into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bin {
    /// Inclusive upper edge of the range, in milliseconds.
    pub bound: u32,
    pub frequency: u32,
}

impl Bin {
    pub fn new(bound: u32, frequency: u32) -> Self {
        Self { bound, frequency }
    }
}

//=================
// BinList

/// Ordered list of [`Bin`]s, lowest bound first, with its total and maximum frequency kept up to date on every
/// mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinList {
    bins: Vec<Bin>,
    total_frequency: u64,
    max_frequency: u32,
}

impl BinList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `bin` after the current last bin.
    pub fn push(&mut self, bin: Bin) {
        debug_assert!(
            self.bins.last().map_or(true, |last| last.bound < bin.bound),
            "bin bounds must be strictly increasing"
        );
        self.bins.push(bin);
        self.update_frequencies();
    }

    fn update_frequencies(&mut self) {
        self.total_frequency = self.bins.iter().map(|b| u64::from(b.frequency)).sum();
        self.max_frequency = self.bins.iter().map(|b| b.frequency).max().unwrap_or(0);
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn bin(&self, index: usize) -> Option<&Bin> {
        self.bins.get(index)
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Sum of all bin frequencies.
    pub fn total_frequency(&self) -> u64 {
        self.total_frequency
    }

    /// Largest single bin frequency; `0` for an empty list.
    pub fn max_frequency(&self) -> u32 {
        self.max_frequency
    }

    pub fn bounds(&self) -> impl Iterator<Item = u32> + '_ {
        self.bins.iter().map(|b| b.bound)
    }

    pub fn frequencies(&self) -> impl Iterator<Item = u32> + '_ {
        self.bins.iter().map(|b| b.frequency)
    }

    /// Returns a new list whose frequencies are the bin-by-bin sums of `self` and `other`. Bounds are taken
    /// from `self`.
    ///
    /// # Errors
    /// [`HistogramError::MergeSizeMismatch`] if the two lists have different lengths.
    pub fn merged(&self, other: &BinList) -> Result<BinList, HistogramError> {
        if self.len() != other.len() {
            return Err(HistogramError::MergeSizeMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(self
            .bins
            .iter()
            .zip(other.bins.iter())
            .map(|(b1, b2)| Bin::new(b1.bound, b1.frequency + b2.frequency))
            .collect())
    }
}

impl FromIterator<Bin> for BinList {
    fn from_iter<I: IntoIterator<Item = Bin>>(iter: I) -> Self {
        let mut list = BinList {
            bins: iter.into_iter().collect(),
            total_frequency: 0,
            max_frequency: 0,
        };
        list.update_frequencies();
        list
    }
}
