//! Flag lookup tables shared by every Z80 instance.
//!
//! Built once per process on first use and read-only afterwards, so any
//! number of cores (on any number of threads) can share them.

use once_cell::sync::Lazy;

use crate::cpu::z80::Flag;

pub(crate) const SF: u8 = Flag::S as u8;
pub(crate) const ZF: u8 = Flag::Z as u8;
pub(crate) const YF: u8 = Flag::Y as u8;
pub(crate) const HF: u8 = Flag::H as u8;
pub(crate) const XF: u8 = Flag::X as u8;
pub(crate) const VF: u8 = Flag::PV as u8;
pub(crate) const NF: u8 = Flag::N as u8;
pub(crate) const CF: u8 = Flag::C as u8;

pub struct FlagTables {
    /// S, Z, Y, X for a result byte.
    pub sz: [u8; 256],
    /// BIT: Z and PV set when the masked value is zero, S only from bit 7.
    pub sz_bit: [u8; 256],
    /// `sz` plus even parity in PV.
    pub szp: [u8; 256],
    /// Flags after INC, indexed by the result (C not included).
    pub szhv_inc: [u8; 256],
    /// Flags after DEC, indexed by the result (C not included).
    pub szhv_dec: [u8; 256],
    /// ADD/ADC flags, indexed by `(carry_in << 16) | (old << 8) | new`.
    pub szhvc_add: Box<[u8]>,
    /// SUB/SBC/CP flags, indexed by `(carry_in << 16) | (old << 8) | new`.
    pub szhvc_sub: Box<[u8]>,
}

static TABLES: Lazy<FlagTables> = Lazy::new(|| {
    log::debug!("building Z80 flag tables");
    FlagTables::build()
});

/// The process-wide tables, built on first call.
pub fn tables() -> &'static FlagTables {
    &TABLES
}

#[inline]
pub(crate) fn arith_index(carry_in: bool, old: u8, new: u8) -> usize {
    ((carry_in as usize) << 16) | ((old as usize) << 8) | new as usize
}

impl FlagTables {
    fn build() -> Self {
        let mut sz = [0u8; 256];
        let mut sz_bit = [0u8; 256];
        let mut szp = [0u8; 256];
        let mut szhv_inc = [0u8; 256];
        let mut szhv_dec = [0u8; 256];

        for i in 0..256usize {
            let v = i as u8;
            let mut f = if v == 0 { ZF } else { v & SF };
            f |= v & (YF | XF);
            sz[i] = f;

            sz_bit[i] = (if v == 0 { ZF | VF } else { v & SF }) | (v & (YF | XF));

            szp[i] = f;
            if v.count_ones() % 2 == 0 {
                szp[i] |= VF;
            }

            szhv_inc[i] = f;
            if v == 0x80 {
                szhv_inc[i] |= VF;
            }
            if v & 0x0F == 0x00 {
                szhv_inc[i] |= HF;
            }

            szhv_dec[i] = f | NF;
            if v == 0x7F {
                szhv_dec[i] |= VF;
            }
            if v & 0x0F == 0x0F {
                szhv_dec[i] |= HF;
            }
        }

        let mut szhvc_add = vec![0u8; 2 * 256 * 256].into_boxed_slice();
        let mut szhvc_sub = vec![0u8; 2 * 256 * 256].into_boxed_slice();

        for old in 0..256i32 {
            for new in 0..256i32 {
                let base = (if new == 0 { ZF } else { new as u8 & SF }) | (new as u8 & (YF | XF));

                // add / adc with carry clear
                let val = new - old;
                let mut f = base;
                if (new & 0x0F) < (old & 0x0F) {
                    f |= HF;
                }
                if new < old {
                    f |= CF;
                }
                if (val ^ old ^ 0x80) & (val ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                szhvc_add[arith_index(false, old as u8, new as u8)] = f;

                // adc with carry set
                let val = new - old - 1;
                let mut f = base;
                if (new & 0x0F) <= (old & 0x0F) {
                    f |= HF;
                }
                if new <= old {
                    f |= CF;
                }
                if (val ^ old ^ 0x80) & (val ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                szhvc_add[arith_index(true, old as u8, new as u8)] = f;

                // sub / sbc / cp with carry clear
                let val = old - new;
                let mut f = base | NF;
                if (new & 0x0F) > (old & 0x0F) {
                    f |= HF;
                }
                if new > old {
                    f |= CF;
                }
                if (val ^ old) & (old ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                szhvc_sub[arith_index(false, old as u8, new as u8)] = f;

                // sbc with carry set
                let val = old - new - 1;
                let mut f = base | NF;
                if (new & 0x0F) >= (old & 0x0F) {
                    f |= HF;
                }
                if new >= old {
                    f |= CF;
                }
                if (val ^ old) & (old ^ new) & 0x80 != 0 {
                    f |= VF;
                }
                szhvc_sub[arith_index(true, old as u8, new as u8)] = f;
            }
        }

        Self {
            sz,
            sz_bit,
            szp,
            szhv_inc,
            szhv_dec,
            szhvc_add,
            szhvc_sub,
        }
    }
}
