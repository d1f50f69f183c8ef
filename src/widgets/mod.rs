pub mod chart;
pub mod controls;
pub mod diagnostics;
pub mod kpi;
pub mod selector;
