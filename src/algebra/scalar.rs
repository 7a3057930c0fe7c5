use num_complex::Complex;
use num_traits::Zero;
use std::fmt::{Debug, Display};
use std::ops::{Add, Mul, Neg, Sub};

/// MUMPS arithmetic flavour.
///
/// Each arithmetic is served by its own native library (`smumps`,
/// `dmumps`, `cmumps`, `zmumps`) and exported entry point
/// (`smumps_c`, ...).  The width of the real valued control and
/// information fields of the MUMPS structure follows the precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arithmetic {
    /// real, single precision
    Single,
    /// real, double precision
    Double,
    /// complex, single precision
    ComplexSingle,
    /// complex, double precision
    ComplexDouble,
}

impl Arithmetic {
    /// MUMPS single letter prefix
    pub fn prefix(&self) -> char {
        match self {
            Arithmetic::Single => 's',
            Arithmetic::Double => 'd',
            Arithmetic::ComplexSingle => 'c',
            Arithmetic::ComplexDouble => 'z',
        }
    }

    /// library stem, e.g. "dmumps"
    pub fn library_stem(&self) -> String {
        format!("{}mumps", self.prefix())
    }

    /// name of the exported C entry point, e.g. "dmumps_c"
    pub fn entry_symbol(&self) -> String {
        format!("{}mumps_c", self.prefix())
    }

    /// size in bytes of a real valued field (CNTL, RINFO, ...)
    pub fn real_size(&self) -> usize {
        match self {
            Arithmetic::Single | Arithmetic::ComplexSingle => 4,
            Arithmetic::Double | Arithmetic::ComplexDouble => 8,
        }
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, Arithmetic::ComplexSingle | Arithmetic::ComplexDouble)
    }
}

impl Display for Arithmetic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Arithmetic::Single => "real (single)",
            Arithmetic::Double => "real (double)",
            Arithmetic::ComplexSingle => "complex (single)",
            Arithmetic::ComplexDouble => "complex (double)",
        };
        write!(f, "{name}")
    }
}

/// Scalar types accepted by MUMPS.
///
/// The memory representation of each implementor matches the matrix
/// entry type of the corresponding MUMPS arithmetic.  `Complex<T>` is
/// `#[repr(C)]` and agrees with `mumps_complex` / `mumps_double_complex`.
pub trait MumpsScalar:
    'static
    + Copy
    + Debug
    + Default
    + PartialEq
    + Send
    + Sync
    + Zero
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
{
    /// MUMPS arithmetic serving this scalar type
    const ARITHMETIC: Arithmetic;

    /// absolute value (modulus for complex values) as f64
    fn magnitude(&self) -> f64;

    /// embed a real value
    fn from_real(x: f64) -> Self;

    /// build from real and imaginary parts (the imaginary part is
    /// dropped for real types)
    fn from_parts(re: f64, im: f64) -> Self;
}

impl MumpsScalar for f32 {
    const ARITHMETIC: Arithmetic = Arithmetic::Single;
    fn magnitude(&self) -> f64 {
        self.abs() as f64
    }
    fn from_real(x: f64) -> Self {
        x as f32
    }
    fn from_parts(re: f64, _im: f64) -> Self {
        re as f32
    }
}

impl MumpsScalar for f64 {
    const ARITHMETIC: Arithmetic = Arithmetic::Double;
    fn magnitude(&self) -> f64 {
        self.abs()
    }
    fn from_real(x: f64) -> Self {
        x
    }
    fn from_parts(re: f64, _im: f64) -> Self {
        re
    }
}

impl MumpsScalar for Complex<f32> {
    const ARITHMETIC: Arithmetic = Arithmetic::ComplexSingle;
    fn magnitude(&self) -> f64 {
        self.norm() as f64
    }
    fn from_real(x: f64) -> Self {
        Complex::new(x as f32, 0.0)
    }
    fn from_parts(re: f64, im: f64) -> Self {
        Complex::new(re as f32, im as f32)
    }
}

impl MumpsScalar for Complex<f64> {
    const ARITHMETIC: Arithmetic = Arithmetic::ComplexDouble;
    fn magnitude(&self) -> f64 {
        self.norm()
    }
    fn from_real(x: f64) -> Self {
        Complex::new(x, 0.0)
    }
    fn from_parts(re: f64, im: f64) -> Self {
        Complex::new(re, im)
    }
}

#[test]
fn test_arithmetic_names() {
    assert_eq!(Arithmetic::Double.library_stem(), "dmumps");
    assert_eq!(Arithmetic::ComplexDouble.entry_symbol(), "zmumps_c");
    assert_eq!(Arithmetic::ComplexSingle.real_size(), 4);
    assert_eq!(<Complex<f64> as MumpsScalar>::ARITHMETIC, Arithmetic::ComplexDouble);
    assert!(!Arithmetic::Single.is_complex());
}
