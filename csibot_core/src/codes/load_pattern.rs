//! Load pattern types (`eLoadPatternType`).

host_codes! {
    /// Category of a load pattern.
    ///
    /// # Example
    /// ```
    /// use csibot_core::codes::{HostCode, LoadPatternType};
    ///
    /// assert_eq!(LoadPatternType::resolve("Quake").unwrap().code(), 5);
    /// ```
    pub enum LoadPatternType : "load pattern type" {
        Dead = 1 => "Dead",
        SuperDead = 2 => "SuperDead",
        Live = 3 => "Live",
        ReduceLive = 4 => "ReduceLive",
        Quake = 5 => "Quake",
        Wind = 6 => "Wind",
        Snow = 7 => "Snow",
        Other = 8 => "Other",
        Move = 9 => "Move",
        Temperature = 10 => "Temperature",
        RoofLive = 11 => "RoofLive",
        Notional = 12 => "Notional",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::HostCode;

    #[test]
    fn test_codes() {
        assert_eq!(LoadPatternType::Dead.code(), 1);
        assert_eq!(LoadPatternType::Notional.code(), 12);
        assert_eq!(LoadPatternType::resolve("RoofLive").unwrap(), LoadPatternType::RoofLive);
        assert!(LoadPatternType::resolve(13).is_err());
    }
}
