/// Return-on-investment for a resale after import and sale fees.
///
/// roi = round(((resale - purchase - import_fee - sale_fee) / purchase) * 100, 1)
///
/// Amounts are whole currency units. A zero purchase price has no defined ROI.
pub fn calculate_roi(
    purchase_price: u64,
    import_fee: u64,
    sale_fee: u64,
    resale_value: u64,
) -> Result<f64, RoiError> {
    if purchase_price == 0 {
        return Err(RoiError::UndefinedRoi);
    }
    let net = resale_value as i128 - purchase_price as i128 - import_fee as i128 - sale_fee as i128;
    let pct = net as f64 / purchase_price as f64 * 100.0;
    Ok(round_one_decimal(pct))
}

/// Resale estimate: purchase price plus a flat markup.
pub fn estimate_resale_value(purchase_price: u64, markup: u64) -> u64 {
    purchase_price.saturating_add(markup)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoiError {
    #[error("undefined ROI: purchase price is zero")]
    UndefinedRoi,
}

/// Halves round away from zero (0.25 -> 0.3), not to even.
fn round_one_decimal(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}
