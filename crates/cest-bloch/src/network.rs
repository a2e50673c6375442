//! Exchange topology: pools and the directed exchange edges between them.

use cest_core::{Species, ensure_non_negative};
use std::collections::HashSet;

use crate::error::{BlochError, BlochResult};

/// Where a pool takes its resonance offset from when the generator is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetSource {
    /// The pool's own chemical shift.
    #[default]
    Own,
    /// The chemical shift of another pool (by index).
    Pool(usize),
}

/// First-order exchange of magnetization from one pool into another.
///
/// `rate` is the rate (Hz) *from* `from` *into* `into`. The reverse rate is not
/// free: it follows from detailed balance, `rate · M0[from] / M0[into]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeEdge {
    pub from: usize,
    pub into: usize,
    pub rate: f64,
}

/// Validated, immutable exchange topology.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeNetwork {
    pools: Vec<Species>,
    offsets: Vec<OffsetSource>,
    edges: Vec<ExchangeEdge>,
}

impl ExchangeNetwork {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::new()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn pools(&self) -> &[Species] {
        &self.pools
    }

    pub fn edges(&self) -> &[ExchangeEdge] {
        &self.edges
    }

    /// Size of the state vector in reduced coordinates: (Mx, My, Mz) per pool.
    pub fn reduced_dim(&self) -> usize {
        3 * self.pools.len()
    }

    /// Size of the state vector in projective coordinates (trailing constant 1).
    pub fn projective_dim(&self) -> usize {
        self.reduced_dim() + 1
    }

    /// Chemical shift (ppm) used for the pool's precession term.
    pub fn resonance_offset(&self, pool: usize) -> f64 {
        match self.offsets[pool] {
            OffsetSource::Own => self.pools[pool].delta_w(),
            OffsetSource::Pool(source) => self.pools[source].delta_w(),
        }
    }

    /// Total rate (Hz) at which magnetization leaves `pool` through exchange.
    pub fn outflow_rate(&self, pool: usize) -> f64 {
        self.edges
            .iter()
            .map(|edge| {
                if edge.from == pool {
                    edge.rate
                } else if edge.into == pool {
                    self.reverse_rate(edge)
                } else {
                    0.0
                }
            })
            .sum()
    }

    /// Rate (Hz) from `edge.into` back into `edge.from`.
    pub fn reverse_rate(&self, edge: &ExchangeEdge) -> f64 {
        self.pools[edge.from].m0() / self.pools[edge.into].m0() * edge.rate
    }

    /// Thermal equilibrium in reduced coordinates: `M0` on each Mz, zero elsewhere.
    pub fn equilibrium(&self) -> Vec<f64> {
        let mut state = vec![0.0; self.reduced_dim()];
        for (i, pool) in self.pools.iter().enumerate() {
            state[3 * i + 2] = pool.m0();
        }
        state
    }
}

/// Builder for an [`ExchangeNetwork`].
///
/// Pools are indexed in insertion order; pool 0 is conventionally the bulk pool.
/// Call `build()` to validate and freeze the topology.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    pools: Vec<Species>,
    offsets: Vec<OffsetSource>,
    edges: Vec<ExchangeEdge>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pool and return its index.
    pub fn add_pool(&mut self, species: Species) -> usize {
        self.pools.push(species);
        self.offsets.push(OffsetSource::Own);
        self.pools.len() - 1
    }

    /// Add exchange from pool `from` into pool `into` at `rate` Hz.
    pub fn add_exchange(&mut self, from: usize, into: usize, rate: f64) -> &mut Self {
        self.edges.push(ExchangeEdge { from, into, rate });
        self
    }

    /// Override where `pool` takes its resonance offset from.
    pub fn set_offset_source(&mut self, pool: usize, source: OffsetSource) -> &mut Self {
        if let Some(slot) = self.offsets.get_mut(pool) {
            *slot = source;
        }
        self
    }

    pub fn build(self) -> BlochResult<ExchangeNetwork> {
        let n = self.pools.len();
        if n == 0 {
            return Err(BlochError::Topology {
                what: "network has no pools".to_string(),
            });
        }

        for (pool, source) in self.offsets.iter().enumerate() {
            if let OffsetSource::Pool(other) = *source {
                if other >= n {
                    return Err(BlochError::Topology {
                        what: format!(
                            "pool {} takes its offset from pool {}, but only {} pools exist",
                            pool, other, n
                        ),
                    });
                }
            }
        }

        let mut pairs = HashSet::new();
        for edge in &self.edges {
            if edge.from >= n || edge.into >= n {
                return Err(BlochError::Topology {
                    what: format!(
                        "exchange {} -> {} references a missing pool ({} pools)",
                        edge.from, edge.into, n
                    ),
                });
            }
            if edge.from == edge.into {
                return Err(BlochError::Topology {
                    what: format!("pool {} exchanges with itself", edge.from),
                });
            }
            let pair = (edge.from.min(edge.into), edge.from.max(edge.into));
            if !pairs.insert(pair) {
                return Err(BlochError::Topology {
                    what: format!("duplicate exchange between pools {} and {}", pair.0, pair.1),
                });
            }
            ensure_non_negative(edge.rate, "exchange rate")?;
        }

        Ok(ExchangeNetwork {
            pools: self.pools,
            offsets: self.offsets,
            edges: self.edges,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water() -> Species {
        Species::new(1.0, 0.1, 0.0, 1.0).unwrap()
    }

    fn amide() -> Species {
        Species::new(1.0, 0.01, 3.5, 0.001).unwrap()
    }

    fn amine() -> Species {
        Species::new(1.0, 0.01, 2.0, 0.002).unwrap()
    }

    #[test]
    fn detailed_balance_reverse_rate() {
        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(water());
        let b = builder.add_pool(amide());
        builder.add_exchange(b, a, 20.0);
        let network = builder.build().unwrap();

        let edge = network.edges()[0];
        assert!((network.reverse_rate(&edge) - 0.02).abs() < 1e-15);
        assert!((network.outflow_rate(a) - 0.02).abs() < 1e-15);
        assert!((network.outflow_rate(b) - 20.0).abs() < 1e-15);
        assert_eq!(network.reduced_dim(), 6);
        assert_eq!(network.projective_dim(), 7);
    }

    #[test]
    fn bulk_outflow_sums_over_partners() {
        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(water());
        let b = builder.add_pool(amide());
        let c = builder.add_pool(amine());
        builder.add_exchange(b, a, 20.0).add_exchange(c, a, 100.0);
        let network = builder.build().unwrap();

        let expected = 0.001 * 20.0 + 0.002 * 100.0;
        assert!((network.outflow_rate(a) - expected).abs() < 1e-15);
        assert!((network.outflow_rate(c) - 100.0).abs() < 1e-15);
    }

    #[test]
    fn offset_source_redirects_resonance() {
        let mut builder = ExchangeNetwork::builder();
        builder.add_pool(water());
        let b = builder.add_pool(amide());
        let c = builder.add_pool(amine());
        builder.set_offset_source(c, OffsetSource::Pool(b));
        let network = builder.build().unwrap();
        assert_eq!(network.resonance_offset(c), 3.5);
        assert_eq!(network.resonance_offset(b), 3.5);
    }

    #[test]
    fn equilibrium_places_m0_on_mz() {
        let mut builder = ExchangeNetwork::builder();
        builder.add_pool(water());
        builder.add_pool(amide());
        let network = builder.build().unwrap();
        assert_eq!(network.equilibrium(), vec![0.0, 0.0, 1.0, 0.0, 0.0, 0.001]);
    }

    #[test]
    fn rejects_invalid_topologies() {
        assert!(matches!(
            NetworkBuilder::new().build(),
            Err(BlochError::Topology { .. })
        ));

        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(water());
        builder.add_exchange(a, a, 1.0);
        assert!(matches!(builder.build(), Err(BlochError::Topology { .. })));

        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(water());
        builder.add_exchange(3, a, 1.0);
        assert!(matches!(builder.build(), Err(BlochError::Topology { .. })));

        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(water());
        let b = builder.add_pool(amide());
        builder.add_exchange(b, a, 1.0).add_exchange(a, b, 2.0);
        assert!(matches!(builder.build(), Err(BlochError::Topology { .. })));

        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(water());
        let b = builder.add_pool(amide());
        builder.add_exchange(b, a, -1.0);
        assert!(matches!(builder.build(), Err(BlochError::Core(_))));

        let mut builder = ExchangeNetwork::builder();
        let a = builder.add_pool(water());
        builder.set_offset_source(a, OffsetSource::Pool(4));
        assert!(matches!(builder.build(), Err(BlochError::Topology { .. })));
    }
}
