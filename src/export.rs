use crate::models::Item;

pub const CSV_HEADER: [&str; 4] = ["ID", "Name", "Quantity", "Price"];
pub const CSV_FILENAME: &str = "inventory.csv";

/// Renders items as CSV: a header row then one row per item, `\r\n`
/// terminated, quoting only fields that need it.
pub fn items_to_csv(items: &[Item]) -> String {
    let mut csv = String::new();
    write_row(&mut csv, CSV_HEADER.iter().map(|field| field.to_string()));

    for item in items {
        write_row(
            &mut csv,
            [
                item.id.to_string(),
                item.name.clone(),
                item.quantity.to_string(),
                item.price_text(),
            ],
        );
    }

    csv
}

fn write_row(csv: &mut String, fields: impl IntoIterator<Item = String>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            csv.push(',');
        }
        csv.push_str(&escape_field(&field));
    }
    csv.push_str("\r\n");
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str, quantity: i64, price: f64) -> Item {
        Item {
            id,
            name: name.to_string(),
            quantity,
            price,
        }
    }

    #[test]
    fn test_header_only_when_empty() {
        assert_eq!(items_to_csv(&[]), "ID,Name,Quantity,Price\r\n");
    }

    #[test]
    fn test_two_items_produce_three_lines() {
        let csv = items_to_csv(&[item(1, "Widget", 5, 2.50), item(2, "Gadget", 10, 3.0)]);

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec!["ID,Name,Quantity,Price", "1,Widget,5,2.5", "2,Gadget,10,3.0"]
        );
    }

    #[test]
    fn test_fields_needing_quotes() {
        let csv = items_to_csv(&[item(1, "Nuts, \"large\"", 3, 0.25)]);
        assert!(csv.ends_with("1,\"Nuts, \"\"large\"\"\",3,0.25\r\n"));
    }

    #[test]
    fn test_large_and_tiny_prices_use_signed_exponents() {
        let csv = items_to_csv(&[item(1, "x", 1, 1e16), item(2, "y", 1, 0.00001)]);
        assert!(csv.ends_with("1,x,1,1e+16\r\n2,y,1,1e-05\r\n"));
    }
}
