//! Builders for rig export text used across the unit tests

const COLUMNS: [&str; 19] = [
    "Timestamp UTC",
    "autoCounter",
    "i_POS1_cal [m]",
    "i_PS1_filt [Pa]",
    "i_PS2_filt [Pa]",
    "i_PS3_filt [Pa]",
    "i_FS4_cal_m3/s",
    "i_TS1_cal",
    "loadF",
    "sv_compressionLength",
    "F_FrictionStatic",
    "TV2_hi [µm]",
    "TV3_he [µm]",
    "POS1_offset",
    "K_Le [l/min.bar]",
    "o_SV1",
    "o_SV2",
    "Ventilueberdeckung [%]",
    "sv_loadLength",
];

/// One raw sample with plausible defaults for every channel.
#[derive(Debug, Clone)]
pub struct RawSample {
    timestamp_ns: i64,
    cycle: i64,
    position_m: f64,
    pressures_pa: [f64; 3],
    flow: f64,
    temperature: f64,
    friction: f64,
    int_leakage: f64,
    ext_leakage: f64,
    offset: f64,
    leakage_coefficient: f64,
}

impl RawSample {
    pub fn new(timestamp_ns: i64, cycle: i64) -> Self {
        Self {
            timestamp_ns,
            cycle,
            position_m: 0.1,
            pressures_pa: [5_000_000.0, 2_500_000.0, 100_000.0],
            flow: 0.0001,
            temperature: 40.5,
            friction: 900.0,
            int_leakage: 10.0,
            ext_leakage: 5.0,
            offset: 0.5,
            leakage_coefficient: 0.0001,
        }
    }

    pub fn position(mut self, meters: f64) -> Self {
        self.position_m = meters;
        self
    }

    /// Sets the PS1 channel only.
    pub fn pressure(mut self, pascals: f64) -> Self {
        self.pressures_pa[0] = pascals;
        self
    }

    pub fn friction(mut self, newtons: f64) -> Self {
        self.friction = newtons;
        self
    }

    pub fn int_leakage(mut self, microns: f64) -> Self {
        self.int_leakage = microns;
        self
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.timestamp_ns.to_string(),
            self.cycle.to_string(),
            self.position_m.to_string(),
            self.pressures_pa[0].to_string(),
            self.pressures_pa[1].to_string(),
            self.pressures_pa[2].to_string(),
            self.flow.to_string(),
            self.temperature.to_string(),
            "10".to_string(),
            "5".to_string(),
            self.friction.to_string(),
            self.int_leakage.to_string(),
            self.ext_leakage.to_string(),
            self.offset.to_string(),
            self.leakage_coefficient.to_string(),
            "1".to_string(),
            "0".to_string(),
            "12.5".to_string(),
            "3".to_string(),
        ]
    }
}

/// Tab separated export in the shape of the press rig's files.
#[derive(Debug, Default)]
pub struct RigExport {
    rows: Vec<RawSample>,
}

impl RigExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, sample: RawSample) -> Self {
        self.rows.push(sample);
        self
    }

    pub fn build(&self) -> String {
        let mut text = format!("\t{}\n", COLUMNS.join("\t"));
        for (index, sample) in self.rows.iter().enumerate() {
            text.push_str(&format!("{}\t{}\n", index, sample.cells().join("\t")));
        }
        text
    }
}

/// Two cycles: three samples 1 ms apart, then two samples starting at 5 ms.
pub fn two_cycle_export() -> String {
    RigExport::new()
        .row(RawSample::new(0, 1).position(0.125).pressure(12_345_678.0))
        .row(RawSample::new(1_000_000, 1).position(0.2))
        .row(RawSample::new(2_000_000, 1).position(0.3))
        .row(RawSample::new(5_000_000, 2).friction(1600.0))
        .row(RawSample::new(6_000_000, 2).friction(1600.0))
        .build()
}
