use ndarray::{Array2, Zip};
use num_complex::Complex;

use crate::model::ArrayData;
use crate::types::DerivedOperation;

/// Element-wise map over complex samples; real input is taken as `re + 0i`
fn map_samples<T, F>(data: &ArrayData, f: F) -> Array2<T>
where
    T: Send,
    F: Fn(Complex<f32>) -> T + Sync + Send,
{
    match data {
        ArrayData::Complex(a) => Zip::from(a).par_map_collect(|z| f(*z)),
        ArrayData::Real(a) => Zip::from(a).par_map_collect(|v| f(Complex::new(*v, 0.0))),
    }
}

impl DerivedOperation {
    /// Apply the operation to every sample. `Conj` keeps complex data; every
    /// other operation yields `float32`.
    pub fn apply(&self, data: &ArrayData) -> ArrayData {
        match self {
            DerivedOperation::Amplitude => ArrayData::Real(map_samples(data, |z| z.norm())),
            DerivedOperation::Phase => ArrayData::Real(map_samples(data, |z| z.arg())),
            DerivedOperation::Real => ArrayData::Real(map_samples(data, |z| z.re)),
            DerivedOperation::Imag => ArrayData::Real(map_samples(data, |z| z.im)),
            DerivedOperation::Conj => ArrayData::Complex(map_samples(data, |z| z.conj())),
            DerivedOperation::Intensity => ArrayData::Real(map_samples(data, |z| z.norm_sqr())),
            DerivedOperation::LogAmplitude => ArrayData::Real(map_samples(data, |z| z.norm().log10())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn sample() -> ArrayData {
        ArrayData::Complex(array![[Complex::new(3.0f32, 4.0), Complex::new(0.0, -2.0)]])
    }

    fn real(data: ArrayData) -> Array2<f32> {
        match data {
            ArrayData::Real(a) => a,
            ArrayData::Complex(_) => panic!("expected real output"),
        }
    }

    #[test]
    fn amplitude_and_intensity() {
        let amp = real(DerivedOperation::Amplitude.apply(&sample()));
        assert_relative_eq!(amp[[0, 0]], 5.0);
        assert_relative_eq!(amp[[0, 1]], 2.0);

        let intensity = real(DerivedOperation::Intensity.apply(&sample()));
        assert_relative_eq!(intensity[[0, 0]], 25.0);
    }

    #[test]
    fn phase_real_imag() {
        let phase = real(DerivedOperation::Phase.apply(&sample()));
        assert_relative_eq!(phase[[0, 1]], -std::f32::consts::FRAC_PI_2);
        assert_eq!(real(DerivedOperation::Real.apply(&sample()))[[0, 0]], 3.0);
        assert_eq!(real(DerivedOperation::Imag.apply(&sample()))[[0, 1]], -2.0);
    }

    #[test]
    fn conj_stays_complex() {
        let out = DerivedOperation::Conj.apply(&sample());
        assert_eq!(out.dtype(), "complex64");
        let ArrayData::Complex(a) = out else { unreachable!() };
        assert_eq!(a[[0, 0]], Complex::new(3.0, -4.0));
    }

    #[test]
    fn log_amplitude_and_real_input() {
        let log = real(DerivedOperation::LogAmplitude.apply(&sample()));
        assert_relative_eq!(log[[0, 0]], 5.0f32.log10());

        let detected = ArrayData::Real(array![[-2.0f32, 100.0]]);
        let log = real(DerivedOperation::LogAmplitude.apply(&detected));
        assert_relative_eq!(log[[0, 1]], 2.0);
        assert_eq!(real(DerivedOperation::Amplitude.apply(&detected))[[0, 0]], 2.0);
        assert_eq!(real(DerivedOperation::Imag.apply(&detected))[[0, 0]], 0.0);
    }
}
