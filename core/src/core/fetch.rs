//! Opcode fetch map: O(1) translation of an emulated address to the byte the
//! CPU fetches as an opcode or immediate operand.
//!
//! The 64KB space is split into 256-byte banks. Each bank either delegates to
//! the host [`Bus`], points into a host-supplied memory region, or reads as
//! open bus. Regions live in an arena and banks refer to them by slot, so no
//! host pointer arithmetic leaks out of this module.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::core::{Bus, BusMaster};
use crate::error::Z80Error;

/// Value read from an address nothing drives.
pub const OPEN_BUS: u8 = 0xFF;

pub const BANK_SHIFT: u32 = 8;
pub const BANK_COUNT: usize = 1 << (16 - BANK_SHIFT);
const BANK_MASK: u16 = (1 << BANK_SHIFT) - 1;

/// Host memory shared between the fetch map and the host's bus.
///
/// Clones are handles to the same bytes: the host keeps one, writes RAM
/// through it from `Bus::write`, and the CPU fetches the new contents.
#[derive(Clone, Debug)]
pub struct FetchRegion(Arc<[AtomicU8]>);

impl FetchRegion {
    /// `len` zeroed bytes.
    pub fn new(len: usize) -> Self {
        Self((0..len).map(|_| AtomicU8::new(0)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.0.get(offset).map(|b| b.load(Ordering::Relaxed))
    }

    /// Store `data` at `offset`; out-of-range writes are ignored.
    #[inline]
    pub fn set(&self, offset: usize, data: u8) {
        if let Some(b) = self.0.get(offset) {
            b.store(data, Ordering::Relaxed);
        }
    }

    /// Copy `data` in starting at `offset`, clipped to the region.
    pub fn load(&self, offset: usize, data: &[u8]) {
        for (i, &byte) in data.iter().enumerate() {
            self.set(offset + i, byte);
        }
    }

    /// True when both handles refer to the same memory.
    pub fn same_memory(&self, other: &FetchRegion) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<&[u8]> for FetchRegion {
    fn from(data: &[u8]) -> Self {
        Self(data.iter().map(|&b| AtomicU8::new(b)).collect())
    }
}

impl From<Vec<u8>> for FetchRegion {
    fn from(data: Vec<u8>) -> Self {
        Self::from(data.as_slice())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bank {
    /// Fetch through `Bus::read`.
    Bus,
    /// Fetch from `regions[region][offset + (addr & BANK_MASK)]`.
    Region { region: usize, offset: usize },
    OpenBus,
}

#[derive(Clone, Debug)]
pub struct FetchMap {
    banks: [Bank; BANK_COUNT],
    /// Slots freed when no bank refers to them any more are reused.
    regions: Vec<Option<FetchRegion>>,
}

impl Default for FetchMap {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchMap {
    /// Every bank delegates to the bus.
    pub fn new() -> Self {
        Self {
            banks: [Bank::Bus; BANK_COUNT],
            regions: Vec::new(),
        }
    }

    /// Map emulated addresses `[low, high]` onto `data`, with `data[0]` at the
    /// start of the bank containing `low`. Granularity is one bank, so `low`
    /// is rounded down and `high` rounded up to bank boundaries.
    ///
    /// May be called repeatedly to describe ROM, RAM windows and mirrors; the
    /// same memory mapped twice is stored once. Regions left with no bank
    /// pointing at them are dropped.
    pub fn set_fetch(&mut self, low: u16, high: u16, data: FetchRegion) -> Result<(), Z80Error> {
        if low > high {
            return Err(Z80Error::InvalidFetchRange { low, high });
        }

        let len = data.len();
        let region = self.slot_for(data);

        let first = (low >> BANK_SHIFT) as usize;
        let last = (high >> BANK_SHIFT) as usize;
        for bank in first..=last {
            self.banks[bank] = Bank::Region {
                region,
                offset: (bank - first) << BANK_SHIFT,
            };
        }
        self.release_unused();
        log::debug!(
            "fetch map: {:04X}-{:04X} -> region {} ({} bytes)",
            first << BANK_SHIFT,
            (last << BANK_SHIFT) | BANK_MASK as usize,
            region,
            len
        );
        Ok(())
    }

    /// Mark `[low, high]` as unmapped: fetches there read [`OPEN_BUS`].
    pub fn unmap(&mut self, low: u16, high: u16) -> Result<(), Z80Error> {
        if low > high {
            return Err(Z80Error::InvalidFetchRange { low, high });
        }
        let first = (low >> BANK_SHIFT) as usize;
        let last = (high >> BANK_SHIFT) as usize;
        self.banks[first..=last].fill(Bank::OpenBus);
        self.release_unused();
        log::debug!("fetch map: {:04X}-{:04X} unmapped", low, high);
        Ok(())
    }

    /// Drop every region and go back to fetching through the bus.
    pub fn clear(&mut self) {
        self.banks = [Bank::Bus; BANK_COUNT];
        self.regions.clear();
    }

    /// True when `addr` is served from a mapped region.
    pub fn is_mapped(&self, addr: u16) -> bool {
        matches!(self.banks[(addr >> BANK_SHIFT) as usize], Bank::Region { .. })
    }

    /// Number of distinct regions currently mapped.
    pub fn region_count(&self) -> usize {
        self.regions.iter().filter(|r| r.is_some()).count()
    }

    fn slot_for(&mut self, data: FetchRegion) -> usize {
        if let Some(idx) = self
            .regions
            .iter()
            .position(|r| r.as_ref().is_some_and(|r| r.same_memory(&data)))
        {
            return idx;
        }
        match self.regions.iter().position(Option::is_none) {
            Some(idx) => {
                self.regions[idx] = Some(data);
                idx
            }
            None => {
                self.regions.push(Some(data));
                self.regions.len() - 1
            }
        }
    }

    fn release_unused(&mut self) {
        let mut used = vec![false; self.regions.len()];
        for bank in &self.banks {
            if let Bank::Region { region, .. } = *bank {
                used[region] = true;
            }
        }
        for (slot, used) in self.regions.iter_mut().zip(used) {
            if !used {
                *slot = None;
            }
        }
    }

    #[inline]
    pub fn fetch<B: Bus<Address = u16, Data = u8> + ?Sized>(
        &self,
        bus: &mut B,
        master: BusMaster,
        addr: u16,
    ) -> u8 {
        match self.banks[(addr >> BANK_SHIFT) as usize] {
            Bank::Bus => bus.read(master, addr),
            Bank::Region { region, offset } => self.regions[region]
                .as_ref()
                .and_then(|r| r.get(offset + (addr & BANK_MASK) as usize))
                .unwrap_or(OPEN_BUS),
            Bank::OpenBus => OPEN_BUS,
        }
    }
}
