//! Built-in demo records.

use crate::models::record::{Field, ReferenceRecord};

const SAMPLE_ROWS: [[&str; Field::COUNT]; 10] = [
    ["S001", "Hemanshu Kasar", "Nagpur", "23", "India", "7, gurudeo nagar"],
    ["S002", "John Doe", "New York", "30", "USA", "123 Main St"],
    ["S003", "Sarah Johnson", "London", "27", "UK", "45 Oxford Street"],
    ["S004", "Raj Patel", "Mumbai", "32", "India", "201, Sea View Apartments"],
    ["S005", "Maria Garcia", "Barcelona", "29", "Spain", "Carrer de Mallorca, 15"],
    ["S006", "Akira Tanaka", "Tokyo", "35", "Japan", "2-1-3 Shibuya"],
    ["S007", "Chen Wei", "Shanghai", "26", "China", "88 Nanjing Road"],
    ["S008", "Lucas Silva", "São Paulo", "31", "Brazil", "Rua Augusta, 1200"],
    ["S009", "Olivia Miller", "Sydney", "28", "Australia", "42 Bondi Beach Road"],
    ["S010", "Ahmed Hassan", "Cairo", "33", "Egypt", "17 Al Tahrir Square"],
];

pub(super) fn records() -> impl Iterator<Item = (String, ReferenceRecord)> {
    SAMPLE_ROWS.into_iter().map(|row| {
        let record: ReferenceRecord = Field::ALL
            .into_iter()
            .zip(row)
            .map(|(field, value)| (field, value.to_string()))
            .collect();
        (row[0].to_string(), record)
    })
}
