//! Reservation station pool: tracks in-flight instructions awaiting operand
//! availability, with O(1) allocation and removal via a swap-to-watermark
//! free list.

use crate::trace::Trace;

/// One reservation-station slot.
#[derive(Debug, Clone)]
pub struct RsEntry {
    /// Slot occupied.
    pub valid: bool,
    /// Already dispatched to its functional unit this cycle or earlier.
    pub running: bool,
    /// ROB slot that will receive this instruction's completion.
    pub rob_index: usize,
    /// RS slot producing `rs1`'s value, or `None` if already available.
    pub rs1_index: Option<usize>,
    /// RS slot producing `rs2`'s value, or `None` if already available.
    pub rs2_index: Option<usize>,
    /// The instruction occupying this slot.
    pub trace: Option<Trace>,
}

impl Default for RsEntry {
    fn default() -> Self {
        Self {
            valid: false,
            running: false,
            rob_index: 0,
            rs1_index: None,
            rs2_index: None,
            trace: None,
        }
    }
}

/// Fixed-capacity reservation-station pool.
#[derive(Debug)]
pub struct Rs {
    entries: Vec<RsEntry>,
    /// Permutation of `0..capacity`: `indices[0..watermark)` are allocated
    /// slots, `indices[watermark..)` are free. Order within each half is
    /// unspecified — this is an unordered pool, not a FIFO.
    indices: Vec<usize>,
    watermark: usize,
}

impl Rs {
    /// Creates an empty pool with room for `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: (0..capacity).map(|_| RsEntry::default()).collect(),
            indices: (0..capacity).collect(),
            watermark: 0,
        }
    }

    /// Capacity of the pool.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Number of currently allocated slots.
    #[must_use]
    pub fn size(&self) -> usize {
        self.watermark
    }

    /// Whether every slot is allocated.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.watermark == self.entries.len()
    }

    /// Whether no slot is allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watermark == 0
    }

    /// Reserves a free slot for `trace` and its operand dependencies.
    ///
    /// # Panics
    ///
    /// Panics if the pool is full — callers must check `is_full` first;
    /// issue reports a full RS as a structural stall before ever reaching here.
    pub fn push(
        &mut self,
        trace: Trace,
        rob_index: usize,
        rs1_index: Option<usize>,
        rs2_index: Option<usize>,
    ) -> usize {
        assert!(!self.is_full(), "reservation station push on a full pool");
        let slot = self.indices[self.watermark];
        self.watermark += 1;
        self.entries[slot] = RsEntry {
            valid: true,
            running: false,
            rob_index,
            rs1_index,
            rs2_index,
            trace: Some(trace),
        };
        slot
    }

    /// Invalidates `slot` and returns it to the free pool.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not currently a valid, allocated slot.
    pub fn remove(&mut self, slot: usize) {
        assert!(self.entries[slot].valid, "reservation station remove on an invalid slot");
        self.entries[slot] = RsEntry::default();
        let pos = self.indices[..self.watermark]
            .iter()
            .position(|&s| s == slot)
            .expect("removed slot must be within the allocated region");
        self.watermark -= 1;
        self.indices.swap(pos, self.watermark);
    }

    /// Read-only access to a slot by index.
    #[must_use]
    pub fn get(&self, slot: usize) -> &RsEntry {
        &self.entries[slot]
    }

    /// Mutable access to a slot by index.
    pub fn get_mut(&mut self, slot: usize) -> &mut RsEntry {
        &mut self.entries[slot]
    }

    /// Iterates all slots in index order, valid or not. `execute`/`writeback`
    /// scans in this order to get deterministic tie-breaks.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RsEntry)> {
        self.entries.iter().enumerate()
    }

    /// Mutable version of `iter`.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut RsEntry)> {
        self.entries.iter_mut().enumerate()
    }
}
