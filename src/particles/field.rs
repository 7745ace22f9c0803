//! One-time spatial setup: clustered point cloud and a sparse static
//! connection overlay.

use std::f32::consts::PI;

use rand::Rng;

/// Interleaved xyz / rgb buffers ready for upload.
#[derive(Debug, Clone, Default)]
pub struct ParticleCloud {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
    pub velocities: Vec<f32>,
}

impl ParticleCloud {
    /// `count` is split evenly across `clusters`; the remainder is dropped.
    pub fn generate<R: Rng>(rng: &mut R, count: usize, clusters: usize) -> Self {
        let clusters = clusters.max(1);
        let per_cluster = count / clusters;
        let total = per_cluster * clusters;

        let mut cloud = Self {
            positions: Vec::with_capacity(total * 3),
            colors: Vec::with_capacity(total * 3),
            sizes: Vec::with_capacity(total),
            velocities: Vec::with_capacity(total * 3),
        };

        for c in 0..clusters {
            let center = [
                (rng.gen::<f32>() - 0.5) * 100.0,
                (rng.gen::<f32>() - 0.5) * 60.0,
                (rng.gen::<f32>() - 0.5) * 40.0,
            ];

            for _ in 0..per_cluster {
                let theta = rng.gen::<f32>() * PI * 2.0;
                let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
                let radius = rng.gen::<f32>() * 20.0 + 5.0;
                cloud.positions.extend_from_slice(&[
                    center[0] + radius * phi.sin() * theta.cos(),
                    center[1] + radius * phi.sin() * theta.sin(),
                    center[2] + radius * phi.cos(),
                ]);

                let t = c as f32 / clusters as f32 + (rng.gen::<f32>() - 0.5) * 0.2;
                cloud.colors.extend_from_slice(&[
                    0.66 - t * 0.4,
                    0.33 + t * 0.6,
                    0.93 + rng.gen::<f32>() * 0.07,
                ]);

                cloud.sizes.push(rng.gen::<f32>() * 3.0 + 0.5);

                for _ in 0..3 {
                    cloud.velocities.push((rng.gen::<f32>() - 0.5) * 0.02);
                }
            }
        }

        cloud
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn position(&self, i: usize) -> [f32; 3] {
        [self.positions[i * 3], self.positions[i * 3 + 1], self.positions[i * 3 + 2]]
    }
}

/// Line segment endpoints and their colors, two vertices per edge.
#[derive(Debug, Clone, Default)]
pub struct Connections {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
}

impl Connections {
    pub fn edge_count(&self) -> usize {
        self.positions.len() / 6
    }
}

/// Samples pairs at a stride of `len / 500` and keeps close ones with
/// probability `keep_probability`, up to `max_edges`.
pub fn connect<R: Rng>(
    rng: &mut R,
    cloud: &ParticleCloud,
    max_edges: usize,
    max_distance: f32,
    keep_probability: f64,
) -> Connections {
    let n = cloud.len();
    let stride = (n / 500).max(1);
    let mut out = Connections::default();
    let mut edges = 0;

    'outer: for i in (0..n).step_by(stride) {
        let a = cloud.position(i);
        for j in ((i + stride)..n).step_by(stride) {
            if edges >= max_edges {
                break 'outer;
            }
            let b = cloud.position(j);
            let d = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt();
            if d < max_distance && rng.gen::<f64>() < keep_probability {
                out.positions.extend_from_slice(&a);
                out.positions.extend_from_slice(&b);

                let k = 1.0 - d / max_distance;
                out.colors.extend_from_slice(&[0.66 * k, 0.33 * k, 0.97 * k, 0.13 * k, 0.83 * k, 0.93 * k]);
                edges += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn cloud_buffers_line_up() {
        let mut rng = StdRng::seed_from_u64(7);
        let cloud = ParticleCloud::generate(&mut rng, 3000, 7);
        assert_eq!(cloud.len(), 2996);
        assert_eq!(cloud.positions.len(), cloud.len() * 3);
        assert_eq!(cloud.colors.len(), cloud.len() * 3);
        assert_eq!(cloud.velocities.len(), cloud.len() * 3);
    }

    #[test]
    fn attributes_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let cloud = ParticleCloud::generate(&mut rng, 700, 7);
        assert!(cloud.sizes.iter().all(|s| (0.5..3.5).contains(s)));
        assert!(cloud.velocities.iter().all(|v| v.abs() <= 0.01));
        // every point sits inside the padded cluster volume
        for i in 0..cloud.len() {
            let [x, y, z] = cloud.position(i);
            assert!(x.abs() <= 75.0 && y.abs() <= 55.0 && z.abs() <= 45.0);
        }
    }

    #[test]
    fn connections_respect_cap_and_distance() {
        let mut rng = StdRng::seed_from_u64(3);
        let cloud = ParticleCloud::generate(&mut rng, 3000, 7);
        let lines = connect(&mut rng, &cloud, 300, 12.0, 0.3);
        assert!(lines.edge_count() <= 300);
        assert_eq!(lines.colors.len(), lines.positions.len());
        for e in lines.positions.chunks(6) {
            let d = ((e[3] - e[0]).powi(2) + (e[4] - e[1]).powi(2) + (e[5] - e[2]).powi(2)).sqrt();
            assert!(d < 12.0);
        }
    }

    #[test]
    fn zero_keep_probability_draws_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let cloud = ParticleCloud::generate(&mut rng, 1000, 7);
        assert_eq!(connect(&mut rng, &cloud, 800, 12.0, 0.0).edge_count(), 0);
    }
}
