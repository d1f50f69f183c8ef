#![allow(dead_code)]

use polars::prelude::*;
use salesdash::{source, OpenOptions};
use std::path::{Path, PathBuf};

pub const HEADER: &str =
    "Order ID, Order Date ,Amount,Profit,Quantity,Category,Sub-Category,PaymentMode,City,State";

/// Twelve data lines: one duplicate, one with a missing Profit and one with an unparseable date.
pub const SALES_CSV: &str = "\
Order ID, Order Date ,Amount,Profit,Quantity,Category,Sub-Category,PaymentMode,City,State
B-1001,2023-01-05 10:15,1200,150,3,Electronics,Phones,UPI,Pune,Maharashtra
B-1002,2023-01-05 14:30,800,-40,2,Furniture,Chairs,COD,Indore,Madhya Pradesh
B-1003,2023-01-20 09:00,450,60,1,Clothing,Saree,Credit Card,Pune,Maharashtra
B-1003,2023-01-20 09:00,450,60,1,Clothing,Saree,Credit Card,Pune,Maharashtra
B-1004,2023-02-11 18:45,2300,410,5,Electronics,Printers,UPI,Mumbai,Maharashtra
B-1005,2023-02-11 19:05,150,,1,Clothing,Stole,UPI,Delhi,Delhi
B-1006,2023-03-02 08:10,990,120,2,Furniture,Bookcases,Debit Card,Delhi,Delhi
B-1007,not a date,300,30,1,Clothing,Hankerchief,COD,Indore,Madhya Pradesh
B-1008,2023-11-30 21:40,640,80,4,Electronics,Phones,EMI,Mumbai,Maharashtra
B-1008,2023-11-30 21:40,220,25,1,Clothing,Saree,EMI,Mumbai,Maharashtra
B-1009,2023-12-24 00:05,1750,-120,3,Furniture,Tables,Credit Card,Kolkata,West Bengal
B-1010,2023-12-24 23:59,95,12,1,Clothing,Stole,UPI,Pune,Maharashtra
";

pub fn read(csv: &str) -> DataFrame {
    source::read_csv_bytes(csv.as_bytes().to_vec(), &OpenOptions::new()).unwrap()
}

pub fn sales_frame() -> DataFrame {
    read(SALES_CSV)
}

pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

pub fn f64_values(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}

pub fn i32_values(df: &DataFrame, name: &str) -> Vec<i32> {
    df.column(name)
        .unwrap()
        .i32()
        .unwrap()
        .into_iter()
        .flatten()
        .collect()
}
