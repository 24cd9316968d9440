//! Material types (`eMatType`).

host_codes! {
    /// Material type passed to `PropMaterial.SetMaterial`.
    pub enum MaterialType : "material type" {
        Steel = 1 => "Steel",
        Concrete = 2 => "Concrete",
        NoDesign = 3 => "NoDesign",
        Aluminum = 4 => "Aluminum",
        ColdFormed = 5 => "ColdFormed",
        Rebar = 6 => "Rebar",
        Tendon = 7 => "Tendon",
        Masonry = 8 => "Masonry",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::HostCode;

    #[test]
    fn test_codes() {
        assert_eq!(MaterialType::Steel.code(), 1);
        assert_eq!(MaterialType::Masonry.code(), 8);
        assert_eq!(MaterialType::resolve("ColdFormed").unwrap(), MaterialType::ColdFormed);
    }
}
