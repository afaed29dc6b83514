use cz80_core::cpu::z80::tables::tables;
mod common;
use common::{CF, HF, NF, PF, SF, XF, YF, ZF};

fn index(carry: bool, old: u8, new: u8) -> usize {
    ((carry as usize) << 16) | ((old as usize) << 8) | new as usize
}

fn sz_xy(v: u8) -> u8 {
    (if v == 0 { ZF } else { v & SF }) | (v & (YF | XF))
}

#[test]
fn test_add_table_matches_inline_rules() {
    let t = tables();
    for old in 0..=255u8 {
        for operand in 0..=255u8 {
            for carry in [false, true] {
                let c = carry as u16;
                let sum = old as u16 + operand as u16 + c;
                let new = sum as u8;
                let mut f = sz_xy(new);
                if (old & 0x0F) as u16 + (operand & 0x0F) as u16 + c > 0x0F {
                    f |= HF;
                }
                if sum > 0xFF {
                    f |= CF;
                }
                if (old ^ operand) & 0x80 == 0 && (old ^ new) & 0x80 != 0 {
                    f |= PF;
                }
                assert_eq!(
                    t.szhvc_add[index(carry, old, new)],
                    f,
                    "{old:02X} + {operand:02X} + {c}"
                );
            }
        }
    }
}

#[test]
fn test_sub_table_matches_inline_rules() {
    let t = tables();
    for old in 0..=255u8 {
        for operand in 0..=255u8 {
            for carry in [false, true] {
                let c = carry as i16;
                let diff = old as i16 - operand as i16 - c;
                let new = diff as u8;
                let mut f = sz_xy(new) | NF;
                if ((old & 0x0F) as i16) - ((operand & 0x0F) as i16) - c < 0 {
                    f |= HF;
                }
                if diff < 0 {
                    f |= CF;
                }
                if (old ^ operand) & 0x80 != 0 && (old ^ new) & 0x80 != 0 {
                    f |= PF;
                }
                assert_eq!(
                    t.szhvc_sub[index(carry, old, new)],
                    f,
                    "{old:02X} - {operand:02X} - {c}"
                );
            }
        }
    }
}

#[test]
fn test_parity_table() {
    let t = tables();
    for v in 0..=255u8 {
        let even = v.count_ones() % 2 == 0;
        assert_eq!(t.szp[v as usize] & PF != 0, even, "{v:02X}");
        assert_eq!(t.szp[v as usize] & !PF, t.sz[v as usize]);
    }
}

#[test]
fn test_inc_dec_half_carry() {
    let t = tables();
    for v in 0..=255u8 {
        let inc = v.wrapping_add(1);
        assert_eq!(t.szhv_inc[inc as usize] & HF != 0, v & 0x0F == 0x0F, "INC {v:02X}");
        let dec = v.wrapping_sub(1);
        assert_eq!(t.szhv_dec[dec as usize] & HF != 0, v & 0x0F == 0x00, "DEC {v:02X}");
    }
}
