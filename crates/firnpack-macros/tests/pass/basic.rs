use firnpack_macros::Profile;

#[derive(Debug, Clone, Copy, Profile)]
pub struct TestLayer {
    pub height: f64,
    pub density: f64,
    pub temperature: f64,
}

fn main() {
    let v = TestLayer { height: 0.1, density: 300.0, temperature: 265.0 };
    let mut profile = TestLayerProfile::with_capacity(10);
    profile.push(&v);
    assert_eq!(profile.len(), 1);
    assert!(!profile.is_empty());
    assert_eq!(TestLayer::field_names(), &["height", "density", "temperature"]);
}
