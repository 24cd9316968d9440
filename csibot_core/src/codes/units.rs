//! Unit systems understood by the host (`eUnits`).

use super::HostCode;

host_codes! {
    /// Force / length / temperature unit system.
    ///
    /// Labels follow the host's naming: `<force>_<length>_<temperature>`.
    ///
    /// # Example
    /// ```
    /// use csibot_core::codes::{HostCode, UnitSystem};
    ///
    /// let units = UnitSystem::resolve("kip_ft_F").unwrap();
    /// assert_eq!(units.code(), 4);
    /// assert_eq!(units.force_unit(), "kip");
    /// assert_eq!(units.length_unit(), "ft");
    /// ```
    #[derive(Default)]
    pub enum UnitSystem : "units" {
        LbInF = 1 => "lb_in_F",
        LbFtF = 2 => "lb_ft_F",
        KipInF = 3 => "kip_in_F",
        KipFtF = 4 => "kip_ft_F",
        KnMmC = 5 => "kN_mm_C",
        KnMC = 6 => "kN_m_C",
        KgfMmC = 7 => "kgf_mm_C",
        KgfMC = 8 => "kgf_m_C",
        NMmC = 9 => "N_mm_C",
        NMC = 10 => "N_m_C",
        TonfMmC = 11 => "tonf_mm_C",
        #[default]
        TonfMC = 12 => "tonf_m_C",
        KnCmC = 13 => "kN_cm_C",
        KgfCmC = 14 => "kgf_cm_C",
        NCmC = 15 => "N_cm_C",
        TonfCmC = 16 => "tonf_cm_C",
    }
}

impl UnitSystem {
    fn part(self, index: usize) -> &'static str {
        self.label().split('_').nth(index).unwrap_or("")
    }

    /// Force unit ("lb", "kip", "kN", "kgf", "N", "tonf")
    pub fn force_unit(self) -> &'static str {
        self.part(0)
    }

    /// Length unit ("in", "ft", "mm", "cm", "m")
    pub fn length_unit(self) -> &'static str {
        self.part(1)
    }

    /// Temperature scale, "F" or "C"
    pub fn temperature_unit(self) -> &'static str {
        self.part(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tonf_m_c() {
        assert_eq!(UnitSystem::default(), UnitSystem::TonfMC);
        assert_eq!(UnitSystem::default().code(), 12);
    }

    #[test]
    fn test_components() {
        assert_eq!(UnitSystem::KnCmC.force_unit(), "kN");
        assert_eq!(UnitSystem::KnCmC.length_unit(), "cm");
        assert_eq!(UnitSystem::KnCmC.temperature_unit(), "C");
        assert_eq!(UnitSystem::LbInF.temperature_unit(), "F");
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&UnitSystem::TonfCmC).unwrap();
        assert_eq!(json, "\"tonf_cm_C\"");
        let parsed: UnitSystem = serde_json::from_str("16").unwrap();
        assert_eq!(parsed, UnitSystem::TonfCmC);
    }
}
