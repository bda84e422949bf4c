//! Numerus (plural form) rules.
//!
//! The rules are a flat bytecode program: rules separated by `NEWRULE`, each
//! an `OR` of `AND`-ed terms. A term is an opcode byte followed by one right
//! operand (two for `BETWEEN`):
//!
//!   bits 0..2  operator  EQ=1 LT=2 LEQ=3 BETWEEN=4
//!   0x08       negate the term
//!   0x10       left operand n % 10
//!   0x20       left operand n % 100
//!   0x40       left operand reduced below 1000 by repeated division
//!   0x80       reserved, always invalid
//!
//! Resolving a quantity yields the index of the first rule that holds, or the
//! rule count when none does.

use crate::errors::{CatalogError, Result};

pub const Q_EQ: u8 = 0x01;
pub const Q_LT: u8 = 0x02;
pub const Q_LEQ: u8 = 0x03;
pub const Q_BETWEEN: u8 = 0x04;
pub const Q_OP_MASK: u8 = 0x07;

pub const Q_NOT: u8 = 0x08;
pub const Q_MOD_10: u8 = 0x10;
pub const Q_MOD_100: u8 = 0x20;
pub const Q_LEAD_1000: u8 = 0x40;
const Q_RESERVED: u8 = 0x80;

pub const Q_AND: u8 = 0xFD;
pub const Q_OR: u8 = 0xFE;
pub const Q_NEWRULE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transform { Identity, Mod10, Mod100, Lead1000 }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison { Eq, Lt, Leq, Between }

impl Transform {
    fn of(opcode: u8) -> Self {
        if opcode & Q_MOD_10 != 0 {
            Transform::Mod10
        } else if opcode & Q_MOD_100 != 0 {
            Transform::Mod100
        } else if opcode & Q_LEAD_1000 != 0 {
            Transform::Lead1000
        } else {
            Transform::Identity
        }
    }

    fn apply(self, n: i32) -> i32 {
        match self {
            Transform::Identity => n,
            Transform::Mod10 => n % 10,
            Transform::Mod100 => n % 100,
            Transform::Lead1000 => {
                let mut v = n;
                while v >= 1000 {
                    v /= 1000;
                }
                v
            }
        }
    }
}

impl Comparison {
    fn of(opcode: u8) -> Option<Self> {
        match opcode & Q_OP_MASK {
            Q_EQ => Some(Comparison::Eq),
            Q_LT => Some(Comparison::Lt),
            Q_LEQ => Some(Comparison::Leq),
            Q_BETWEEN => Some(Comparison::Between),
            _ => None,
        }
    }
}

/// Static check of a rules program; an empty program is valid.
pub fn is_valid(rules: &[u8]) -> bool {
    if rules.is_empty() {
        return true;
    }
    let size = rules.len();
    let mut offset = 0usize;
    loop {
        let opcode = rules[offset];
        if opcode & Q_RESERVED != 0 {
            return false;
        }

        offset += 1;
        if offset == size {
            return false; // missing operand
        }
        // right operand
        offset += 1;

        match Comparison::of(opcode) {
            Some(Comparison::Eq | Comparison::Lt | Comparison::Leq) => {}
            Some(Comparison::Between) => {
                if offset == size {
                    return false; // missing upper bound
                }
                offset += 1;
            }
            None => return false,
        }

        if offset == size {
            return true;
        }
        if !matches!(rules[offset], Q_AND | Q_OR | Q_NEWRULE) {
            return false;
        }
        offset += 1;
        if offset == size {
            return false; // dangling separator
        }
    }
}

/// A rules program that passed [`is_valid`]. Only these are ever executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluralRules<'a> {
    code: &'a [u8],
}

impl<'a> PluralRules<'a> {
    pub fn new(code: &'a [u8]) -> Result<Self> {
        if is_valid(code) {
            Ok(Self { code })
        } else {
            Err(CatalogError::InvalidPluralRules)
        }
    }

    /// Program with no plural distinction: every quantity maps to form 0.
    pub fn empty() -> Self {
        Self { code: &[] }
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.code
    }

    /// Index of the plural form for `n`.
    pub fn resolve(&self, n: i32) -> u32 {
        let rules = self.code;
        let size = rules.len();
        if size == 0 {
            return 0;
        }

        let mut result = 0u32;
        let mut i = 0usize;
        loop {
            let mut or_value = false;
            loop {
                let mut and_value = true;
                loop {
                    let opcode = rules[i];
                    let left = Transform::of(opcode).apply(n);
                    let right = rules[i + 1] as i32;
                    i += 2;

                    let mut truth = match Comparison::of(opcode) {
                        Some(Comparison::Eq) => left == right,
                        Some(Comparison::Lt) => left < right,
                        Some(Comparison::Leq) => left <= right,
                        Some(Comparison::Between) => {
                            let top = rules[i] as i32;
                            i += 1;
                            left >= right && left <= top
                        }
                        None => false,
                    };
                    if opcode & Q_NOT != 0 {
                        truth = !truth;
                    }
                    and_value = and_value && truth;

                    if i == size || rules[i] != Q_AND {
                        break;
                    }
                    i += 1;
                }

                or_value = or_value || and_value;

                if i == size || rules[i] != Q_OR {
                    break;
                }
                i += 1;
            }

            if or_value {
                return result;
            }
            result += 1;
            if i == size {
                return result;
            }
            i += 1; // NEWRULE
        }
    }
}

impl Default for PluralRules<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(code: &[u8]) -> PluralRules<'_> {
        PluralRules::new(code).expect("valid rules")
    }

    #[test]
    fn one_versus_other() {
        let code = [Q_EQ, 1];
        let r = rules(&code);
        assert_eq!(r.resolve(1), 0);
        assert_eq!(r.resolve(0), 1);
        assert_eq!(r.resolve(5), 1);
    }

    #[test]
    fn empty_program_is_form_zero() {
        assert!(is_valid(&[]));
        assert_eq!(PluralRules::empty().resolve(0), 0);
        assert_eq!(PluralRules::empty().resolve(42), 0);
    }

    #[test]
    fn mod_10_transform() {
        let code = [Q_EQ | Q_MOD_10, 1];
        let r = rules(&code);
        assert_eq!(r.resolve(21), 0);
        assert_eq!(r.resolve(22), 1);
    }

    #[test]
    fn mod_100_and_lead_1000() {
        let code = [Q_EQ | Q_MOD_100, 11];
        assert_eq!(rules(&code).resolve(111), 0);
        assert_eq!(rules(&code).resolve(112), 1);

        let code = [Q_EQ | Q_LEAD_1000, 2];
        assert_eq!(rules(&code).resolve(2_000_000), 0);
        assert_eq!(rules(&code).resolve(2500), 0);
        assert_eq!(rules(&code).resolve(3000), 1);
    }

    #[test]
    fn between_is_inclusive() {
        let code = [Q_BETWEEN, 2, 4];
        let r = rules(&code);
        for n in [2, 3, 4] {
            assert_eq!(r.resolve(n), 0, "n={n}");
        }
        for n in [1, 5] {
            assert_eq!(r.resolve(n), 1, "n={n}");
        }
    }

    #[test]
    fn negation_and_conjunction() {
        // n % 10 == 1 && n % 100 != 11
        let code = [Q_EQ | Q_MOD_10, 1, Q_AND, Q_EQ | Q_MOD_100 | Q_NOT, 11];
        let r = rules(&code);
        assert_eq!(r.resolve(1), 0);
        assert_eq!(r.resolve(21), 0);
        assert_eq!(r.resolve(11), 1);
        assert_eq!(r.resolve(12), 1);
    }

    #[test]
    fn polish_three_forms() {
        // one: n == 1; few: n%10 in 2..4 && n%100 not in 12..14; other
        let code = [
            Q_EQ, 1,
            Q_NEWRULE,
            Q_BETWEEN | Q_MOD_10, 2, 4, Q_AND, Q_BETWEEN | Q_MOD_100 | Q_NOT, 12, 14,
        ];
        let r = rules(&code);
        assert_eq!(r.resolve(1), 0);
        assert_eq!(r.resolve(2), 1);
        assert_eq!(r.resolve(24), 1);
        assert_eq!(r.resolve(12), 2);
        assert_eq!(r.resolve(5), 2);
        assert_eq!(r.resolve(0), 2);
    }

    #[test]
    fn disjunction_first_match_wins() {
        let code = [Q_EQ, 0, Q_OR, Q_EQ, 1, Q_NEWRULE, Q_LT, 10];
        let r = rules(&code);
        assert_eq!(r.resolve(0), 0);
        assert_eq!(r.resolve(1), 0);
        assert_eq!(r.resolve(5), 1);
        assert_eq!(r.resolve(50), 2);
    }

    #[test]
    fn validation_rejects_malformed() {
        // operator with no right operand
        assert!(!is_valid(&[Q_EQ]));
        assert!(!is_valid(&[Q_EQ, 1, Q_AND, Q_LT]));
        // between missing its upper bound at the end of the buffer
        assert!(!is_valid(&[Q_BETWEEN, 2]));
        // between eats the separator as its upper bound, leaving junk
        assert!(!is_valid(&[Q_BETWEEN, 2, Q_AND, Q_EQ, 1]));
        // reserved high bit and unknown operators
        assert!(!is_valid(&[0x80 | Q_EQ, 1]));
        assert!(!is_valid(&[0x00, 1]));
        assert!(!is_valid(&[0x05, 1]));
        // junk where a separator is expected
        assert!(!is_valid(&[Q_EQ, 1, 0x42, Q_EQ, 2]));
        // separator with nothing after it
        assert!(!is_valid(&[Q_EQ, 1, Q_NEWRULE]));
        assert!(matches!(PluralRules::new(&[Q_LT]), Err(CatalogError::InvalidPluralRules)));
    }

    #[test]
    fn validation_accepts_well_formed() {
        assert!(is_valid(&[Q_EQ, 1]));
        assert!(is_valid(&[Q_LEQ | Q_NOT, 1, Q_OR, Q_BETWEEN, 2, 4, Q_NEWRULE, Q_EQ, 0]));
    }
}
