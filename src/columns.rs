//! Column names referenced by the pipeline (after header whitespace trimming).

pub const ORDER_DATE: &str = "Order Date";
pub const AMOUNT: &str = "Amount";
pub const PROFIT: &str = "Profit";
pub const ORDER_ID: &str = "Order ID";
pub const QUANTITY: &str = "Quantity";
pub const CITY: &str = "City";
pub const STATE: &str = "State";
pub const CATEGORY: &str = "Category";
pub const SUB_CATEGORY: &str = "Sub-Category";
pub const PAYMENT_MODE: &str = "PaymentMode";

// Derived by temporal normalization
pub const MONTH: &str = "Month";
pub const HOUR: &str = "Hour";
pub const YEAR: &str = "Year";

/// Every input column some metric or chart reads.
pub const EXPECTED: [&str; 10] = [
    ORDER_DATE,
    AMOUNT,
    PROFIT,
    ORDER_ID,
    QUANTITY,
    CITY,
    STATE,
    CATEGORY,
    SUB_CATEGORY,
    PAYMENT_MODE,
];
