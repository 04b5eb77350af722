//! Raw batch builders shared by the integration tests.

#![allow(dead_code)]

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

/// The attributes tests vary; every other raw column gets a fixed value.
#[derive(Debug, Clone)]
pub struct Purchase {
    pub property_id: i64,
    pub price: f64,
    pub property_type: &'static str,
    pub rooms: i64,
    pub city: Option<&'static str>,
    pub customer_salary: i64,
}

impl Purchase {
    pub fn new(property_id: i64, price: f64) -> Self {
        Self {
            property_id,
            price,
            property_type: "Apartment",
            rooms: 2,
            city: Some("Porto"),
            customer_salary: 42_000,
        }
    }

    pub fn property_type(mut self, value: &'static str) -> Self {
        self.property_type = value;
        self
    }

    pub fn rooms(mut self, value: i64) -> Self {
        self.rooms = value;
        self
    }

    pub fn city(mut self, value: Option<&'static str>) -> Self {
        self.city = value;
        self
    }

    pub fn salary(mut self, value: i64) -> Self {
        self.customer_salary = value;
        self
    }
}

fn ints(name: &str, records: &[Purchase], value: impl Fn(&Purchase) -> i64) -> Column {
    Series::new(name.into(), records.iter().map(value).collect::<Vec<_>>()).into_column()
}

fn floats(name: &str, records: &[Purchase], value: impl Fn(&Purchase) -> f64) -> Column {
    Series::new(name.into(), records.iter().map(value).collect::<Vec<_>>()).into_column()
}

fn texts(name: &str, records: &[Purchase], value: impl Fn(&Purchase) -> Option<&'static str>) -> Column {
    Series::new(name.into(), records.iter().map(value).collect::<Vec<_>>()).into_column()
}

/// A raw batch with every column of the property-purchase record shape.
pub fn raw_batch(records: &[Purchase]) -> DataFrame {
    let columns = vec![
        ints("property_id", records, |r| r.property_id),
        floats("price", records, |r| r.price),
        floats("down_payment", records, |r| r.price * 0.2),
        ints("decision", records, |r| i64::from(r.price < 300_000.0)),
        texts("property_type", records, |r| Some(r.property_type)),
        texts("furnishing_status", records, |_| Some("Furnished")),
        ints("rooms", records, |r| r.rooms),
        ints("bathrooms", records, |_| 1),
        ints("garage", records, |_| 0),
        ints("garden", records, |_| 1),
        ints("property_size_sqft", records, |r| 400 + r.rooms * 250),
        texts("country", records, |_| Some("Portugal")),
        texts("city", records, |r| r.city),
        ints("crime_cases_reported", records, |_| 2),
        ints("legal_cases_on_property", records, |_| 0),
        ints("neighbourhood_rating", records, |_| 7),
        ints("connectivity_score", records, |_| 8),
        ints("customer_salary", records, |r| r.customer_salary),
        ints("loan_amount", records, |r| r.customer_salary * 5),
        ints("loan_tenure_years", records, |_| 25),
        ints("monthly_expenses", records, |_| 1_200),
        floats("emi_to_income_ratio", records, |_| 0.35),
        ints("previous_owners", records, |r| r.property_id % 3),
    ];
    DataFrame::new(columns).expect("raw batch")
}

pub fn i64_values(frame: &DataFrame, column: &str) -> Vec<Option<i64>> {
    frame
        .column(column)
        .expect("column")
        .i64()
        .expect("i64 column")
        .into_iter()
        .collect()
}
