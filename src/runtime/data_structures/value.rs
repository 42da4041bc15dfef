use crate::runtime::{
    data_structures::word::WordPtr,
    error::{self, ErrorKind, runtime_error},
};
use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    rc::Rc,
};

/// Core value enumeration of the interpreter.  This enumeration represents all data types that the
/// virtual machine and the underlying language code can understand and manipulate.
#[derive(Clone)]
pub enum Value {
    /// A 64-bit signed integer.
    Int(i64),

    /// An IEEE-754 double precision floating point value.
    Float(f64),

    /// A boolean value.
    Bool(bool),

    /// A symbol or string, as grabbed from the character stream by `word`.
    Symbol(String),

    /// A reference to a dictionary entry.  Produced by `'`, `[']`, and `lastword`.
    Word(WordPtr),
}

impl Value {
    /// Check if the value is an integer.
    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    /// Check if the value is a floating point number.
    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    /// Check if the value is a boolean.
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if the value is a symbol.
    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    /// Check if the value is a word reference.
    pub fn is_word(&self) -> bool {
        matches!(self, Value::Word(_))
    }

    /// Is the value any kind of numeric variant?  Booleans take part in the numeric tower,
    /// coercing to 0 and 1.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Bool(_))
    }

    /// Check if either of the two values is a float.
    pub fn either_is_float(a: &Value, b: &Value) -> bool {
        a.is_float() || b.is_float()
    }

    /// Are both values numeric types?
    pub fn both_are_numeric(a: &Value, b: &Value) -> bool {
        a.is_numeric() && b.is_numeric()
    }

    /// Convert the value to an integer.  Only meaningful for values that satisfy is_numeric(),
    /// callers are expected to have checked beforehand.
    pub fn get_int_val(&self) -> i64 {
        match self {
            Value::Int(value) => *value,
            Value::Float(value) => *value as i64,
            Value::Bool(value) => {
                if *value {
                    1
                } else {
                    0
                }
            }
            _ => panic!("Value is not convertible to int."),
        }
    }

    /// Convert the value to a floating point number.  Only meaningful for values that satisfy
    /// is_numeric(), callers are expected to have checked beforehand.
    pub fn get_float_val(&self) -> f64 {
        match self {
            Value::Int(value) => *value as f64,
            Value::Float(value) => *value,
            Value::Bool(value) => {
                if *value {
                    1.0
                } else {
                    0.0
                }
            }
            _ => panic!("Value is not convertible to float."),
        }
    }

    /// The truthiness of the value, used by the conditional and logical words.  Zero numbers and
    /// the empty symbol are falsy, everything else is truthy.
    pub fn get_bool_val(&self) -> bool {
        match self {
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Bool(value) => *value,
            Value::Symbol(value) => !value.is_empty(),
            Value::Word(_) => true,
        }
    }

    /// Get the word reference held by the value, or a type error if it is anything else.
    pub fn as_word(&self) -> error::Result<&WordPtr> {
        match self {
            Value::Word(word) => Ok(word),
            _ => runtime_error(ErrorKind::Type, format!("Value {} is not a word", self)),
        }
    }

}

fn expect_numeric(value: &Value, operation: &str) -> error::Result<()> {
    if !value.is_numeric() {
        return runtime_error(
            ErrorKind::Type,
            format!("Numeric value expected by \"{}\", got {}", operation, value),
        );
    }

    Ok(())
}

fn expect_numeric_pair(a: &Value, b: &Value, operation: &str) -> error::Result<()> {
    expect_numeric(a, operation)?;
    expect_numeric(b, operation)
}

/// Floor division on integers, rounding toward negative infinity.
fn floor_div_i64(a: i64, b: i64) -> i64 {
    let quotient = a.wrapping_div(b);
    let remainder = a.wrapping_rem(b);

    if remainder != 0 && (remainder < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}

/// Modulus on integers with the sign of the divisor.
fn floor_mod_i64(a: i64, b: i64) -> i64 {
    let remainder = a.wrapping_rem(b);

    if remainder != 0 && (remainder < 0) != (b < 0) {
        remainder + b
    } else {
        remainder
    }
}

/// Modulus on floats with the sign of the divisor.
fn floor_mod_f64(a: f64, b: f64) -> f64 {
    let remainder = a % b;

    if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
        remainder + b
    } else {
        remainder
    }
}

/// Arithmetic on values.  Binary operations follow the numeric tower: if either operand is a
/// float the result is a float, otherwise integer arithmetic is used with booleans coerced to
/// 0/1.  Integer operations wrap on overflow.
impl Value {
    pub fn add(a: &Value, b: &Value) -> error::Result<Value> {
        expect_numeric_pair(a, b, "+")?;

        if Value::either_is_float(a, b) {
            Ok(Value::Float(a.get_float_val() + b.get_float_val()))
        } else {
            Ok(Value::Int(a.get_int_val().wrapping_add(b.get_int_val())))
        }
    }

    pub fn sub(a: &Value, b: &Value) -> error::Result<Value> {
        expect_numeric_pair(a, b, "-")?;

        if Value::either_is_float(a, b) {
            Ok(Value::Float(a.get_float_val() - b.get_float_val()))
        } else {
            Ok(Value::Int(a.get_int_val().wrapping_sub(b.get_int_val())))
        }
    }

    pub fn mul(a: &Value, b: &Value) -> error::Result<Value> {
        expect_numeric_pair(a, b, "*")?;

        if Value::either_is_float(a, b) {
            Ok(Value::Float(a.get_float_val() * b.get_float_val()))
        } else {
            Ok(Value::Int(a.get_int_val().wrapping_mul(b.get_int_val())))
        }
    }

    /// True division.  Always produces a float, even for evenly dividing integers.
    pub fn div(a: &Value, b: &Value) -> error::Result<Value> {
        expect_numeric_pair(a, b, "/")?;

        if b.get_float_val() == 0.0 {
            return runtime_error(ErrorKind::Arithmetic, "Division by zero");
        }

        Ok(Value::Float(a.get_float_val() / b.get_float_val()))
    }

    /// Floor division.  Integer when both operands are integral, otherwise a floored float.
    pub fn floor_div(a: &Value, b: &Value) -> error::Result<Value> {
        expect_numeric_pair(a, b, "//")?;

        if Value::either_is_float(a, b) {
            if b.get_float_val() == 0.0 {
                return runtime_error(ErrorKind::Arithmetic, "Division by zero");
            }

            Ok(Value::Float((a.get_float_val() / b.get_float_val()).floor()))
        } else {
            if b.get_int_val() == 0 {
                return runtime_error(ErrorKind::Arithmetic, "Division by zero");
            }

            Ok(Value::Int(floor_div_i64(a.get_int_val(), b.get_int_val())))
        }
    }

    /// Modulus, with the result taking the sign of the divisor.
    pub fn modulus(a: &Value, b: &Value) -> error::Result<Value> {
        expect_numeric_pair(a, b, "mod")?;

        if Value::either_is_float(a, b) {
            if b.get_float_val() == 0.0 {
                return runtime_error(ErrorKind::Arithmetic, "Modulo by zero");
            }

            Ok(Value::Float(floor_mod_f64(
                a.get_float_val(),
                b.get_float_val(),
            )))
        } else {
            if b.get_int_val() == 0 {
                return runtime_error(ErrorKind::Arithmetic, "Modulo by zero");
            }

            Ok(Value::Int(floor_mod_i64(a.get_int_val(), b.get_int_val())))
        }
    }

    /// Exponentiation.  Integer for integer bases with non-negative exponents, float otherwise.
    pub fn pow(a: &Value, b: &Value) -> error::Result<Value> {
        expect_numeric_pair(a, b, "**")?;

        if !Value::either_is_float(a, b) {
            let exponent = b.get_int_val();

            if (0..=u32::MAX as i64).contains(&exponent) {
                return Ok(Value::Int(a.get_int_val().wrapping_pow(exponent as u32)));
            }
        }

        Ok(Value::Float(a.get_float_val().powf(b.get_float_val())))
    }

    pub fn neg(value: &Value) -> error::Result<Value> {
        expect_numeric(value, "neg")?;

        match value {
            Value::Float(value) => Ok(Value::Float(-value)),
            _ => Ok(Value::Int(value.get_int_val().wrapping_neg())),
        }
    }

    pub fn abs(value: &Value) -> error::Result<Value> {
        expect_numeric(value, "abs")?;

        match value {
            Value::Float(value) => Ok(Value::Float(value.abs())),
            _ => Ok(Value::Int(value.get_int_val().wrapping_abs())),
        }
    }

    /// Order two values.  Numerics compare along the numeric tower and symbols compare
    /// lexicographically; any other pairing is a type error.
    pub fn compare(a: &Value, b: &Value) -> error::Result<Ordering> {
        if Value::both_are_numeric(a, b) {
            let ordering = if Value::either_is_float(a, b) {
                a.get_float_val().partial_cmp(&b.get_float_val())
            } else {
                Some(a.get_int_val().cmp(&b.get_int_val()))
            };

            return match ordering {
                Some(ordering) => Ok(ordering),
                None => runtime_error(ErrorKind::Arithmetic, "Values are unordered"),
            };
        }

        if let (Value::Symbol(a), Value::Symbol(b)) = (a, b) {
            return Ok(a.cmp(b));
        }

        runtime_error(
            ErrorKind::Type,
            format!("Values {} and {} cannot be ordered", a, b),
        )
    }
}

/// Manage equality for the value enumeration.  Numeric variants compare across the numeric tower,
/// so `1`, `1.0`, and `True` are all equal.  Symbols compare by text and word references by
/// identity.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        if Value::both_are_numeric(self, other) {
            if Value::either_is_float(self, other) {
                self.get_float_val() == other.get_float_val()
            } else {
                self.get_int_val() == other.get_int_val()
            }
        } else {
            match (self, other) {
                (Value::Symbol(a), Value::Symbol(b)) => a == b,
                (Value::Word(a), Value::Word(b)) => Rc::ptr_eq(a, b),
                _ => false,
            }
        }
    }
}

/// The value enumeration can hold floating point values which strictly speaking violate the Eq
/// trait rules.  Values are used as heap addresses though, so the trait is implemented anyway;
/// NaN keys simply never match.
impl Eq for Value {}

/// Compute the hash of a value.  Booleans and integral floats hash as their integer value so the
/// numeric equality classes hash consistently; other floats hash by their bit pattern.
impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Int(value) => value.hash(state),
            Value::Bool(value) => (*value as i64).hash(state),
            Value::Float(value) => {
                if value.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(value) {
                    (*value as i64).hash(state);
                } else {
                    value.to_bits().hash(state);
                }
            }
            Value::Symbol(value) => value.hash(state),
            Value::Word(word) => word.symbol().hash(state),
        }
    }
}

/// Pretty print the value for stack and heap listings.
impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) => {
                if value.fract() == 0.0 && value.is_finite() {
                    write!(f, "{:.1}", value)
                } else {
                    write!(f, "{}", value)
                }
            }
            Value::Bool(value) => write!(f, "{}", if *value { "True" } else { "False" }),
            Value::Symbol(value) => write!(f, "{}", value),
            Value::Word(word) => write!(f, "{}", word),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Value {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Value {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Value {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Symbol(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::Symbol(value)
    }
}

impl From<WordPtr> for Value {
    fn from(word: WordPtr) -> Value {
        Value::Word(word)
    }
}
