/// Bails out of the enclosing function with a `NotEnoughBytesErr`-flavored error if `$buf`
/// has fewer than `$expected` bytes remaining. Works for both `ReadCursor` and `WriteCursor`
/// (both expose `.len()`), and for either `EncodeError` or `DecodeError` return types via
/// type inference on the enclosing function's `Result`.
macro_rules! ensure_size {
    (ctx: $ctx:expr, in: $buf:expr, size: $expected:expr) => {{
        let received = $buf.len();
        let expected = $expected;
        if received < expected {
            return Err($crate::traits::not_enough_bytes_err($ctx, received, expected));
        }
    }};
    (in: $buf:expr, size: $expected:expr) => {{
        $crate::ensure_size!(ctx: Self::NAME, in: $buf, size: $expected)
    }};
}

macro_rules! ensure_fixed_part_size {
    (in: $buf:expr) => {{
        $crate::ensure_size!(ctx: Self::NAME, in: $buf, size: Self::FIXED_PART_SIZE)
    }};
}

/// Casts a `usize` element count down to the wire integer type, failing with an
/// `InvalidLengthErr` rather than panicking on truncation.
macro_rules! cast_length {
    ($ctx:expr, $field:expr, $len:expr) => {{
        $len.try_into()
            .map_err(|_| $crate::traits::invalid_length_err($ctx, $field, "too many elements"))
    }};
    ($field:expr, $len:expr) => {{
        $crate::cast_length!(Self::NAME, $field, $len)
    }};
}

/// Asserts that the traits support dynamic dispatch.
///
/// From <https://docs.rs/static_assertions/latest/src/static_assertions/assert_obj_safe.rs.html#72-76>
macro_rules! assert_obj_safe {
    ($($xs:path),+ $(,)?) => {
        $(const _: Option<&dyn $xs> = None;)+
    };
}

pub(crate) use assert_obj_safe;
pub(crate) use cast_length;
pub(crate) use ensure_fixed_part_size;
pub(crate) use ensure_size;
