use subtle::ConstantTimeEq;

/// Constant-time comparison of two byte slices.
///
/// The length check short-circuits, but hex digests of the same algorithm
/// always have the same length, so unequal lengths never carry secret
/// information here.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.ct_eq(b).into()
}
