/// Which sequence positions have been entered since the last reset
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionVisitedTracker {
    visited: Vec<bool>,
}

impl PositionVisitedTracker {
    pub fn new(sequence_len: usize) -> Self {
        Self {
            visited: vec![false; sequence_len],
        }
    }

    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    pub fn mark_visited(&mut self, position: usize) {
        if let Some(v) = self.visited.get_mut(position) {
            *v = true;
        }
    }

    /// Positions past the sequence count as visited
    pub fn has_been_visited(&self, position: usize) -> bool {
        self.visited.get(position).copied().unwrap_or(true)
    }

    pub fn reset(&mut self) {
        self.visited.iter_mut().for_each(|v| *v = false);
    }

    /// Mark every position `other` has seen
    pub fn merge(&mut self, other: &PositionVisitedTracker) {
        for (v, o) in self.visited.iter_mut().zip(other.visited.iter()) {
            *v |= *o;
        }
    }

    pub fn first_unvisited(&self) -> Option<usize> {
        self.visited.iter().position(|v| !v)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.iter().filter(|v| **v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_reset() {
        let mut t = PositionVisitedTracker::new(3);
        assert!(!t.has_been_visited(1));
        t.mark_visited(1);
        assert!(t.has_been_visited(1));
        assert_eq!(t.first_unvisited(), Some(0));
        t.reset();
        assert_eq!(t.visited_count(), 0);
    }

    #[test]
    fn out_of_range_is_visited() {
        let mut t = PositionVisitedTracker::new(2);
        t.mark_visited(7);
        assert!(t.has_been_visited(2));
        assert_eq!(t.visited_count(), 0);
    }

    #[test]
    fn merge_unions() {
        let mut a = PositionVisitedTracker::new(3);
        let mut b = PositionVisitedTracker::new(3);
        a.mark_visited(0);
        b.mark_visited(2);
        a.merge(&b);
        assert_eq!(a.first_unvisited(), Some(1));
        assert_eq!(a.visited_count(), 2);
    }
}
