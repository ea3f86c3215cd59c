use firnpack_macros::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Profile)]
#[profile(profile_name = "Rows", derive(PartialOrd))]
pub struct Row {
    pub a: f64,
    pub b: f64,
}

fn main() {
    let mut rows = Rows::with_capacity(3);
    for i in 0..3 {
        rows.push(&Row { a: i as f64, b: 10.0 * i as f64 });
    }
    assert_eq!(rows.get(1), Some(Row { a: 1.0, b: 10.0 }));
    assert_eq!(rows.get(3), None);

    let longer = rows.clone();
    rows.truncate(2);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows.min_len(), 2);
    assert!(rows < longer);

    rows.b.pop();
    assert_eq!(rows.min_len(), 1);
    assert_eq!(rows.get(1), None);
}
