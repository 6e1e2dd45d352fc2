/// Order id gap detection
///
/// Every buy or sell takes the next id from one counter, so ids in a workload
/// are strictly increasing and contiguous. Records missing id ranges and ids
/// that did not move forward.

#[derive(Debug, Clone)]
pub struct GapDetector {
    expected_next: Option<u64>,
    gaps: Vec<(u64, u64)>,        // (start, end) inclusive
    regressions: Vec<(u64, u64)>, // (expected at least, found)
    total_gap_count: u64,
}

impl GapDetector {
    pub fn new() -> Self {
        GapDetector {
            expected_next: None,
            gaps: Vec::new(),
            regressions: Vec::new(),
            total_gap_count: 0,
        }
    }

    /// Expect the first id to be `first_id`
    pub fn starting_at(first_id: u64) -> Self {
        GapDetector {
            expected_next: Some(first_id),
            ..Self::new()
        }
    }

    /// Process an order id; returns false if it did not move forward
    pub fn process(&mut self, order_id: u64) -> bool {
        match self.expected_next {
            None => {
                self.expected_next = Some(order_id.saturating_add(1));
                true
            }
            Some(expected) if order_id < expected => {
                self.regressions.push((expected, order_id));
                false
            }
            Some(expected) => {
                if order_id > expected {
                    self.gaps.push((expected, order_id - 1));
                    self.total_gap_count += order_id - expected;
                }
                self.expected_next = Some(order_id.saturating_add(1));
                true
            }
        }
    }

    /// Missing id ranges, inclusive
    pub fn gaps(&self) -> &[(u64, u64)] {
        &self.gaps
    }

    pub fn regressions(&self) -> &[(u64, u64)] {
        &self.regressions
    }

    /// Total number of missing ids
    pub fn total_gaps(&self) -> u64 {
        self.total_gap_count
    }

    pub fn gap_count(&self) -> usize {
        self.gaps.len()
    }

    /// Id the next order should carry
    pub fn expected_next(&self) -> Option<u64> {
        self.expected_next
    }

    pub fn is_in_gap(&self, order_id: u64) -> bool {
        self.gaps.iter().any(|&(start, end)| order_id >= start && order_id <= end)
    }

    pub fn reset(&mut self) {
        *self = GapDetector::new();
    }
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::new()
    }
}
