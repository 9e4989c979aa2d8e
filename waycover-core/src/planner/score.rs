//! Budget constants and score terms shared by the planner's move
//! selectors. The tour greedily maximizes new-street and new-node gain
//! per kilometer while a budget-fit term steers the projected distance
//! toward the target.

/// Targets below this are clamped up before planning.
pub(crate) const MIN_TARGET_KM: f64 = 0.8;

/// Absolute distance ceiling; no move may project past it.
pub(crate) fn hard_max_km(target_km: f64) -> f64 {
    (target_km * 1.1 + 0.35).max(1.2)
}

/// Outer-loop iteration cap.
pub(crate) fn max_iterations(target_km: f64) -> usize {
    ((target_km * 95.0).round() as usize).max(140)
}

/// Soft completion threshold: once at least one street has been
/// rewarded, the loop stops at this distance.
pub(crate) fn soft_stop_km(target_km: f64) -> f64 {
    target_km * 1.03
}

/// Budget fit for nearby moves (spurs and branch steps): peaks at 1
/// when the projected total matches the target.
pub(crate) fn near_budget_fit(target_km: f64, projected_km: f64) -> f64 {
    1.0 - ((target_km - projected_km).abs() / (target_km * 0.55).max(0.85)).min(1.5)
}

/// Budget fit for global connector moves: compares the move's added
/// distance against the remaining budget.
pub(crate) fn connector_budget_fit(target_km: f64, remaining_km: f64, additional_km: f64) -> f64 {
    1.0 - ((remaining_km - additional_km).abs() / (target_km * 0.5).max(0.7)).min(1.4)
}
