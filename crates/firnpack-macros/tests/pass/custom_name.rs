use firnpack_macros::Profile;

#[derive(Debug, Clone, Copy, Profile)]
#[profile(profile_name = "ColumnArrays")]
pub struct Values {
    pub height: f64,
    pub ice_fraction: f64,
}

fn main() {
    let v = Values { height: 0.5, ice_fraction: 1.0 };
    let mut arrays = ColumnArrays::with_capacity(5);
    arrays.push(&v);
    assert_eq!(arrays.len(), 1);
    assert_eq!(arrays, arrays.clone());
    assert_eq!(Values::field_names(), &["height", "ice_fraction"]);
}
