// src/types.rs
use std::fmt;

/// One decoded 6-axis reading.
///
/// Created only by the decoder. Consumers receive their own copy through their channel.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Sample {
    pub index: u64,
    /// `index * nominal_period`, seconds since the first decoded sample.
    pub timestamp: f64,
    /// deg/s
    pub gyro: [f64; 3],
    /// g
    pub accel: [f64; 3],
}

impl Sample {
    /// "No data" sentinel served when a drain comes back empty.
    pub const ZERO: Sample = Sample {
        index: 0,
        timestamp: 0.0,
        gyro: [0.0; 3],
        accel: [0.0; 3],
    };

    /// Values of one plotted quantity, in X/Y/Z order.
    pub fn group_values(&self, group: SensorGroup) -> [f64; 3] {
        match group {
            SensorGroup::Accel => self.accel,
            SensorGroup::Gyro => self.gyro,
        }
    }

    /// Publisher wire payload: `gyro_x;gyro_y;gyro_z;accel_x;accel_y;accel_z`, 3 decimals each.
    pub fn to_payload(&self) -> String {
        let [gx, gy, gz] = self.gyro;
        let [ax, ay, az] = self.accel;
        format!("{gx:.3};{gy:.3};{gz:.3};{ax:.3};{ay:.3};{az:.3}")
    }
}

/// Quantities plotted together on one shared y axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SensorGroup {
    Accel,
    Gyro,
}

impl SensorGroup {
    pub const ALL: [SensorGroup; 2] = [SensorGroup::Accel, SensorGroup::Gyro];

    pub fn name(&self) -> &'static str {
        match self {
            SensorGroup::Accel => "accel",
            SensorGroup::Gyro => "gyro",
        }
    }

    /// Series names, matching the CSV column names.
    pub fn series_names(&self) -> [&'static str; 3] {
        match self {
            SensorGroup::Accel => ["accel_x", "accel_y", "accel_z"],
            SensorGroup::Gyro => ["gyro_x", "gyro_y", "gyro_z"],
        }
    }

    pub fn series_labels(&self) -> [&'static str; 3] {
        match self {
            SensorGroup::Accel => ["Accel X", "Accel Y", "Accel Z"],
            SensorGroup::Gyro => ["Gyro X", "Gyro Y", "Gyro Z"],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            SensorGroup::Accel => "Acceleration",
            SensorGroup::Gyro => "Gyro",
        }
    }

    pub fn unit_label(&self) -> &'static str {
        match self {
            SensorGroup::Accel => "Acceleration in [G]",
            SensorGroup::Gyro => "Gyro in [deg/s]",
        }
    }
}

impl fmt::Display for SensorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
