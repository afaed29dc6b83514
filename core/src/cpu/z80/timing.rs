//! Instruction timing in T-states.
//!
//! Conditional instructions carry their not-taken cost here; handlers add the
//! `EXTRA_*` constants when the branch is taken or a block instruction repeats.

/// Base opcodes. Prefix bytes: CB/ED are 0 (their tables hold the full cost),
/// DD/FD are the 4 cycles of the prefix fetch itself.
#[rustfmt::skip]
pub const CC_OP: [u8; 256] = [
//  0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
     4, 10,  7,  6,  4,  4,  7,  4,  4, 11,  7,  6,  4,  4,  7,  4, // 0
     8, 10,  7,  6,  4,  4,  7,  4, 12, 11,  7,  6,  4,  4,  7,  4, // 1
     7, 10, 16,  6,  4,  4,  7,  4,  7, 11, 16,  6,  4,  4,  7,  4, // 2
     7, 10, 13,  6, 11, 11, 10,  4,  7, 11, 13,  6,  4,  4,  7,  4, // 3
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 4
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 5
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 6
     7,  7,  7,  7,  7,  7,  4,  7,  4,  4,  4,  4,  4,  4,  7,  4, // 7
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 8
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 9
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // A
     4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // B
     5, 10, 10, 10, 10, 11,  7, 11,  5, 10, 10,  0, 10, 17,  7, 11, // C
     5, 10, 10, 11, 10, 11,  7, 11,  5,  4, 10, 11, 10,  4,  7, 11, // D
     5, 10, 10, 19, 10, 11,  7, 11,  5,  4, 10,  4, 10,  0,  7, 11, // E
     5, 10, 10,  4, 10, 11,  7, 11,  5,  6, 10,  4, 10,  4,  7, 11, // F
];

/// CB opcodes, including the CB prefix fetch.
pub const CC_CB: [u8; 256] = build_cb();

/// ED opcodes, including the ED prefix fetch. Undefined entries are 8-cycle NOPs.
#[rustfmt::skip]
pub const CC_ED: [u8; 256] = [
//  0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // 0
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // 1
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // 2
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // 3
    12, 12, 15, 20,  8, 14,  8,  9, 12, 12, 15, 20,  8, 14,  8,  9, // 4
    12, 12, 15, 20,  8, 14,  8,  9, 12, 12, 15, 20,  8, 14,  8,  9, // 5
    12, 12, 15, 20,  8, 14,  8, 18, 12, 12, 15, 20,  8, 14,  8, 18, // 6
    12, 12, 15, 20,  8, 14,  8,  8, 12, 12, 15, 20,  8, 14,  8,  8, // 7
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // 8
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // 9
    16, 16, 16, 16,  8,  8,  8,  8, 16, 16, 16, 16,  8,  8,  8,  8, // A
    16, 16, 16, 16,  8,  8,  8,  8, 16, 16, 16, 16,  8,  8,  8,  8, // B
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // C
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // D
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // E
     8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8, // F
];

/// Opcodes following a DD/FD prefix, excluding the prefix fetch itself.
/// `(HL)` forms become `(IX+d)` and pay for the displacement.
pub const CC_XY: [u8; 256] = build_xy();

/// DD CB d op / FD CB d op, excluding the DD/FD prefix fetch.
pub const CC_XYCB: [u8; 256] = build_xycb();

/// Taken JR cc / DJNZ.
pub const EXTRA_JR: u32 = 5;
/// Taken CALL cc.
pub const EXTRA_CALL: u32 = 7;
/// Taken RET cc.
pub const EXTRA_RET: u32 = 6;
/// Block instruction that repeats (PC rewound by 2).
pub const EXTRA_BLOCK: u32 = 5;

/// Interrupt acceptance overhead.
pub const NMI: u32 = 11;
pub const IRQ_IM01: u32 = 13;
pub const IRQ_IM2: u32 = 17;

const fn build_cb() -> [u8; 256] {
    let mut t = [8u8; 256];
    let mut op = 0;
    while op < 256 {
        if op & 0x07 == 6 {
            // BIT b,(HL) only reads
            t[op] = if op & 0xC0 == 0x40 { 12 } else { 15 };
        }
        op += 1;
    }
    t
}

/// True for base opcodes that address memory through (HL).
const fn uses_hl_memory(op: u8) -> bool {
    match op {
        0x34 | 0x35 | 0x36 => true,
        0x76 => false,
        0x40..=0xBF => op & 0x07 == 6 || (op >= 0x70 && op <= 0x77),
        _ => false,
    }
}

const fn build_xy() -> [u8; 256] {
    let mut t = [0u8; 256];
    let mut op = 0;
    while op < 256 {
        let base = CC_OP[op];
        t[op] = if op == 0x36 {
            // LD (IX+d),n: displacement overlaps the immediate read
            base + 5
        } else if uses_hl_memory(op as u8) {
            base + 8
        } else {
            base
        };
        op += 1;
    }
    // prefixes are dispatched separately
    t[0xCB] = 0;
    t[0xDD] = 0;
    t[0xED] = 0;
    t[0xFD] = 0;
    t
}

const fn build_xycb() -> [u8; 256] {
    let mut t = [19u8; 256];
    let mut op = 0x40;
    while op < 0x80 {
        t[op] = 16;
        op += 1;
    }
    t
}
