//! Register Status Table: the inverse of the reservation station's
//! `rob_index` field, letting a completing ROB index broadcast to the
//! specific RS slot other entries are waiting on.

/// `rob_index -> rs_index` mapping, one entry per ROB slot.
#[derive(Debug, Clone)]
pub struct Rst {
    entries: Vec<Option<usize>>,
}

impl Rst {
    /// Creates a table sized to `rob_capacity`, all entries initially `None`.
    #[must_use]
    pub fn new(rob_capacity: usize) -> Self {
        Self {
            entries: vec![None; rob_capacity],
        }
    }

    /// Looks up the RS slot producing `rob_index`'s result.
    #[must_use]
    pub fn get(&self, rob_index: usize) -> Option<usize> {
        self.entries[rob_index]
    }

    /// Publishes or clears the RS slot for `rob_index`.
    pub fn set(&mut self, rob_index: usize, rs_index: Option<usize>) {
        self.entries[rob_index] = rs_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let mut rst = Rst::new(8);
        rst.set(3, Some(2));
        assert_eq!(rst.get(3), Some(2));
    }

    #[test]
    fn clearing_resets_to_none() {
        let mut rst = Rst::new(8);
        rst.set(3, Some(2));
        rst.set(3, None);
        assert_eq!(rst.get(3), None);
    }
}
