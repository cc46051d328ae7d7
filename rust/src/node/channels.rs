//! Channel availability tracking with O(log C) min-and-update.

/// Sentinel for padding leaves that hold no channel.
const EMPTY: usize = usize::MAX;

/// Tournament tree over channel availabilities.
///
/// Every internal node stores the index of the channel with the smallest
/// availability in its subtree. Ties resolve to the lower channel index, which
/// matches a left-to-right linear scan for the first minimum.
#[derive(Clone, Debug)]
pub struct ChannelTree {
    /// Availability per channel.
    avail: Vec<f64>,
    /// Winners, 1-based heap layout; leaves start at `size`.
    winners: Vec<usize>,
    /// Number of leaves (power of two, at least 1).
    size: usize,
}

impl ChannelTree {
    /// Build the tree from an availability vector.
    pub fn new(avail: &[f64]) -> Self {
        let size = avail.len().max(1).next_power_of_two();
        let mut winners = vec![EMPTY; 2 * size];
        for (ch, slot) in winners[size..size + avail.len()].iter_mut().enumerate() {
            *slot = ch;
        }
        let mut tree = Self {
            avail: avail.to_vec(),
            winners,
            size,
        };
        for node in (1..size).rev() {
            tree.winners[node] = tree.winner(tree.winners[2 * node], tree.winners[2 * node + 1]);
        }
        tree
    }

    #[inline]
    fn winner(&self, left: usize, right: usize) -> usize {
        if left == EMPTY {
            return right;
        }
        if right == EMPTY {
            return left;
        }
        if self.avail[right] < self.avail[left] {
            right
        } else {
            left
        }
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.avail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.avail.is_empty()
    }

    /// Channel with minimum availability (lowest index on ties) and its time.
    ///
    /// Returns `None` only for a tree built from an empty vector.
    #[inline]
    pub fn min(&self) -> Option<(usize, f64)> {
        let ch = self.winners[1.min(self.winners.len() - 1)];
        if ch == EMPTY {
            None
        } else {
            Some((ch, self.avail[ch]))
        }
    }

    /// Set a channel's availability, returning the previous value.
    pub fn set(&mut self, ch: usize, value: f64) -> f64 {
        let previous = std::mem::replace(&mut self.avail[ch], value);
        let mut node = (self.size + ch) / 2;
        while node >= 1 {
            self.winners[node] = self.winner(self.winners[2 * node], self.winners[2 * node + 1]);
            node /= 2;
        }
        previous
    }

    /// Availabilities in channel order.
    pub fn as_slice(&self) -> &[f64] {
        &self.avail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_min(avail: &[f64]) -> (usize, f64) {
        let mut best = 0;
        for (ch, &value) in avail.iter().enumerate() {
            if value < avail[best] {
                best = ch;
            }
        }
        (best, avail[best])
    }

    #[test]
    fn test_single_channel() {
        let mut tree = ChannelTree::new(&[2.5]);
        assert_eq!(tree.min(), Some((0, 2.5)));
        assert_eq!(tree.set(0, 4.0), 2.5);
        assert_eq!(tree.min(), Some((0, 4.0)));
    }

    #[test]
    fn test_ties_prefer_lowest_index() {
        let tree = ChannelTree::new(&[1.0, 0.0, 0.0, 3.0, 0.0]);
        assert_eq!(tree.min(), Some((1, 0.0)));
    }

    #[test]
    fn test_updates_match_linear_scan() {
        let mut avail = vec![0.5, -1.0, 0.25, 0.75, 2.0, -1.0, 0.0];
        let mut tree = ChannelTree::new(&avail);
        let updates = [(1, 3.0), (5, 1.0), (6, 0.25), (2, 9.0), (0, 0.25), (6, 0.3)];

        for (ch, value) in updates {
            let previous = tree.set(ch, value);
            assert_eq!(previous, avail[ch]);
            avail[ch] = value;
            assert_eq!(tree.min(), Some(linear_min(&avail)));
        }
        assert_eq!(tree.as_slice(), avail.as_slice());
    }

    #[test]
    fn test_restore_previous_value() {
        let mut tree = ChannelTree::new(&[0.0, 1.0]);
        let previous = tree.set(0, 5.0);
        assert_eq!(tree.min(), Some((1, 1.0)));
        tree.set(0, previous);
        assert_eq!(tree.min(), Some((0, 0.0)));
    }

    #[test]
    fn test_empty_tree() {
        let tree = ChannelTree::new(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.min(), None);
    }
}
