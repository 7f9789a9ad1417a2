//! NumPy-style indexing on compressed networks
//!
//! A key is a slice of [`Index`] entries, one per axis (plus any number of
//! [`Index::NewAxis`] entries):
//!
//! | entry            | effect                                        |
//! |------------------|-----------------------------------------------|
//! | `Int(i)`         | fixes the axis (it disappears from the result) |
//! | `Slice(spec)`    | keeps a strided range of the axis             |
//! | `Fancy(indices)` | picks positions; consecutive fancy entries are zipped into one axis |
//! | `NewAxis`        | inserts a size-1 axis                         |
//! | `Ellipsis`       | expands to as many full slices as needed      |
//!
//! Fixed axes are contracted into their neighbours, so the result has the
//! same formats as the input wherever possible. Fancy entries must be
//! contiguous and share one length; interleaving them with slices would need
//! a transposition and is rejected.

use crate::core::{Core, MiddleSum};
use crate::error::{NetworkError, Result};
use crate::network::TensorNetwork;
use log::warn;
use scirs2_core::ndarray_ext::{Array1, Array2, Array3, Axis};
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use tnet_kernels::tt_ops::{absorb_left, absorb_right};

/// Tolerance of the "mask sums to one" check.
const MASK_SUM_TOLERANCE: f64 = 1e-8;

/// Strided range `start..stop` with step `step` (`stop` defaults to the axis size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceSpec {
    pub start: usize,
    pub stop: Option<usize>,
    pub step: usize,
}

impl SliceSpec {
    /// The whole axis.
    pub fn full() -> Self {
        Self {
            start: 0,
            stop: None,
            step: 1,
        }
    }

    pub fn new(start: usize, stop: Option<usize>, step: usize) -> Self {
        Self { start, stop, step }
    }

    /// Positions selected on an axis of size `len` (out-of-range bounds are clipped).
    pub fn resolve(&self, len: usize) -> Result<Vec<usize>> {
        if self.step == 0 {
            return Err(NetworkError::Indexing("slice step cannot be zero".to_string()));
        }
        let stop = self.stop.unwrap_or(len).min(len);
        Ok((self.start.min(stop)..stop).step_by(self.step).collect())
    }
}

/// One entry of an indexing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Index {
    Int(usize),
    Slice(SliceSpec),
    Fancy(Vec<usize>),
    NewAxis,
    Ellipsis,
}

impl Index {
    /// Full slice `..`.
    pub fn full() -> Self {
        Index::Slice(SliceSpec::full())
    }

    /// One fancy entry per column of an integer matrix.
    pub fn fancy_columns(indices: &Array2<usize>) -> Vec<Index> {
        indices
            .columns()
            .into_iter()
            .map(|col| Index::Fancy(col.to_vec()))
            .collect()
    }
}

impl From<usize> for Index {
    fn from(i: usize) -> Self {
        Index::Int(i)
    }
}

impl From<Range<usize>> for Index {
    fn from(r: Range<usize>) -> Self {
        Index::Slice(SliceSpec::new(r.start, Some(r.end), 1))
    }
}

impl From<RangeFrom<usize>> for Index {
    fn from(r: RangeFrom<usize>) -> Self {
        Index::Slice(SliceSpec::new(r.start, None, 1))
    }
}

impl From<RangeTo<usize>> for Index {
    fn from(r: RangeTo<usize>) -> Self {
        Index::Slice(SliceSpec::new(0, Some(r.end), 1))
    }
}

impl From<RangeFull> for Index {
    fn from(_: RangeFull) -> Self {
        Index::full()
    }
}

impl From<SliceSpec> for Index {
    fn from(spec: SliceSpec) -> Self {
        Index::Slice(spec)
    }
}

impl From<Vec<usize>> for Index {
    fn from(indices: Vec<usize>) -> Self {
        Index::Fancy(indices)
    }
}

/// Result of indexing: a scalar when every axis was fixed, a network otherwise.
#[derive(Debug, Clone)]
pub enum Indexed {
    Scalar(f64),
    Network(TensorNetwork),
}

impl Indexed {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Indexed::Scalar(v) => Some(*v),
            Indexed::Network(_) => None,
        }
    }

    pub fn into_network(self) -> Option<TensorNetwork> {
        match self {
            Indexed::Network(t) => Some(t),
            Indexed::Scalar(_) => None,
        }
    }
}

/// Contraction left behind by fixed axes, waiting for the next kept axis.
#[derive(Debug, Clone)]
enum BondFactor {
    /// From a CP axis: scales the shared rank
    Diag(Array1<f64>),
    /// From a TT axis: `(r_left, r_right)` matrix
    Matrix(Array2<f64>),
}

impl BondFactor {
    fn then(self, next: BondFactor) -> BondFactor {
        match (self, next) {
            (BondFactor::Diag(a), BondFactor::Diag(b)) => BondFactor::Diag(a * b),
            (BondFactor::Diag(d), BondFactor::Matrix(m)) => {
                BondFactor::Matrix(m * &d.insert_axis(Axis(1)))
            }
            (BondFactor::Matrix(m), BondFactor::Diag(d)) => BondFactor::Matrix(m * &d),
            (BondFactor::Matrix(a), BondFactor::Matrix(b)) => BondFactor::Matrix(a.dot(&b)),
        }
    }

    fn sum(&self) -> f64 {
        match self {
            BondFactor::Diag(d) => d.sum(),
            BondFactor::Matrix(m) => m.sum(),
        }
    }

    /// Contract into the left bond of `core`.
    fn join(self, core: Core) -> Result<Core> {
        Ok(match (self, core) {
            (BondFactor::Diag(d), Core::Cp(a)) => Core::Cp(a * &d),
            (BondFactor::Matrix(m), Core::Cp(a)) => {
                let (p, r) = a.dim();
                Core::Tt(Array3::from_shape_fn((m.nrows(), p, r), |(i, k, j)| {
                    m[[i, j]] * a[[k, j]]
                }))
            }
            (BondFactor::Diag(d), Core::Tt(g)) => {
                Core::Tt(Array3::from_shape_fn(g.dim(), |(i, k, j)| d[i] * g[[i, k, j]]))
            }
            (BondFactor::Matrix(m), Core::Tt(g)) => Core::Tt(absorb_left(&m, &g)?),
        })
    }

    /// Contract into the right bond of `core`.
    fn absorb_into(self, core: Core) -> Result<Core> {
        Ok(match (core, self) {
            (Core::Cp(a), BondFactor::Diag(d)) => Core::Cp(a * &d),
            (Core::Cp(a), BondFactor::Matrix(m)) => {
                let (p, r) = a.dim();
                Core::Tt(Array3::from_shape_fn((r, p, m.ncols()), |(i, k, j)| {
                    a[[k, i]] * m[[i, j]]
                }))
            }
            (Core::Tt(g), BondFactor::Diag(d)) => {
                Core::Tt(Array3::from_shape_fn(g.dim(), |(i, k, j)| g[[i, k, j]] * d[j]))
            }
            (Core::Tt(g), BondFactor::Matrix(m)) => Core::Tt(absorb_right(&g, &m)?),
        })
    }
}

/// Zip two fancy selections of the same length into one axis.
fn zip_fancy(a: Core, b: Core) -> Core {
    match (a, b) {
        (Core::Cp(x), Core::Cp(y)) => Core::Cp(x * y),
        (Core::Cp(x), Core::Tt(g)) => {
            Core::Tt(Array3::from_shape_fn(g.dim(), |(i, k, j)| x[[k, i]] * g[[i, k, j]]))
        }
        (Core::Tt(g), Core::Cp(y)) => {
            Core::Tt(Array3::from_shape_fn(g.dim(), |(i, k, j)| g[[i, k, j]] * y[[k, j]]))
        }
        (Core::Tt(g1), Core::Tt(g2)) => {
            let (r1, p, _) = g1.dim();
            let r3 = g2.shape()[2];
            let mut out = Array3::<f64>::zeros((r1, p, r3));
            for k in 0..p {
                let slice = g1.index_axis(Axis(1), k).dot(&g2.index_axis(Axis(1), k));
                out.index_axis_mut(Axis(1), k).assign(&slice);
            }
            Core::Tt(out)
        }
    }
}

/// Accumulates the output while walking a key.
struct KeyWalk<'a> {
    source: &'a TensorNetwork,
    cores: Vec<Core>,
    factors: Vec<Option<Array2<f64>>>,
    labels: Vec<Vec<usize>>,
    bond: Option<BondFactor>,
    fancy: Option<Core>,
    fancy_done: bool,
}

impl<'a> KeyWalk<'a> {
    fn new(source: &'a TensorNetwork) -> Self {
        Self {
            source,
            cores: Vec::new(),
            factors: Vec::new(),
            labels: Vec::new(),
            bond: None,
            fancy: None,
            fancy_done: false,
        }
    }

    fn check_position(&self, axis: usize, position: usize) -> Result<()> {
        let size = self.source.shape()[axis];
        if position >= size {
            return Err(NetworkError::Indexing(format!(
                "index {} out of range for axis {} of size {}",
                position, axis, size
            )));
        }
        Ok(())
    }

    /// Emit the pending fancy axis, if any.
    fn flush_fancy(&mut self) -> Result<()> {
        if let Some(mut core) = self.fancy.take() {
            if let Some(bond) = self.bond.take() {
                core = bond.join(core)?;
            }
            self.labels.push((0..core.middle_size()).collect());
            self.cores.push(core);
            self.factors.push(None);
            self.fancy_done = true;
        }
        Ok(())
    }

    fn push(&mut self, mut core: Core, factor: Option<Array2<f64>>, labels: Vec<usize>) -> Result<()> {
        self.flush_fancy()?;
        if let Some(bond) = self.bond.take() {
            core = bond.join(core)?;
        }
        self.cores.push(core);
        self.factors.push(factor);
        self.labels.push(labels);
        Ok(())
    }

    fn slice(&mut self, axis: usize, spec: &SliceSpec) -> Result<()> {
        let positions = spec.resolve(self.source.shape()[axis])?;
        if positions.is_empty() {
            return Err(NetworkError::Indexing(format!(
                "slice {:?} selects nothing on axis {}",
                spec, axis
            )));
        }
        let source = self.source;
        let labels = positions.iter().map(|&p| source.labels[axis][p]).collect();
        let core = &source.cores[axis];
        match &source.factors[axis] {
            Some(u) => self.push(core.clone(), Some(u.select(Axis(0), &positions)), labels),
            None => self.push(core.select_middle(&positions), None, labels),
        }
    }

    fn new_axis(&mut self, counter: usize) -> Result<()> {
        let r = self.source.ranks_tt()[counter];
        let eye = Array2::<f64>::eye(r).insert_axis(Axis(1));
        self.push(Core::Tt(eye), None, vec![0])
    }

    fn int(&mut self, axis: usize, position: usize, after_fancy: bool) -> Result<()> {
        self.check_position(axis, position)?;
        if after_fancy {
            self.flush_fancy()?;
        }
        let source = self.source;
        let core = &source.cores[axis];
        let next = match &source.factors[axis] {
            Some(u) => match core.weighted_middle_sum(&u.row(position).to_owned()) {
                MiddleSum::Matrix(m) => BondFactor::Matrix(m),
                MiddleSum::Diagonal(d) => BondFactor::Diag(d),
            },
            None => match core {
                Core::Tt(g) => BondFactor::Matrix(g.index_axis(Axis(1), position).to_owned()),
                Core::Cp(a) => BondFactor::Diag(a.row(position).to_owned()),
            },
        };
        self.bond = Some(match self.bond.take() {
            Some(prev) => prev.then(next),
            None => next,
        });
        Ok(())
    }

    fn fancy(&mut self, axis: usize, positions: &[usize]) -> Result<()> {
        if self.fancy_done {
            return Err(NetworkError::Indexing(
                "all index arrays must appear contiguously".to_string(),
            ));
        }
        if positions.is_empty() {
            return Err(NetworkError::Indexing("index arrays cannot be empty".to_string()));
        }
        for &p in positions {
            self.check_position(axis, p)?;
        }
        let source = self.source;
        let core = &source.cores[axis];
        let selected = match &source.factors[axis] {
            Some(u) => core.mode_product(&u.select(Axis(0), positions))?,
            None => core.select_middle(positions),
        };
        self.fancy = Some(match self.fancy.take() {
            None => selected,
            Some(prev) => {
                if prev.middle_size() != positions.len() {
                    return Err(NetworkError::Indexing(format!(
                        "index arrays must have the same length ({} vs {})",
                        prev.middle_size(),
                        positions.len()
                    )));
                }
                zip_fancy(prev, selected)
            }
        });
        Ok(())
    }

    fn finish(mut self) -> Result<Indexed> {
        self.flush_fancy()?;
        if let Some(bond) = self.bond.take() {
            match self.cores.pop() {
                Some(last) => self.cores.push(bond.absorb_into(last)?),
                None => return Ok(Indexed::Scalar(bond.sum())),
            }
        }
        let t = TensorNetwork::from_parts(self.cores, self.factors, Some(self.labels))?;
        Ok(Indexed::Network(t))
    }
}

impl TensorNetwork {
    /// Expand the ellipsis and pad the key with full slices.
    fn process_key(&self, key: &[Index]) -> Result<Vec<Index>> {
        let new_axes = key.iter().filter(|k| matches!(k, Index::NewAxis)).count();
        let ellipses = key.iter().filter(|k| matches!(k, Index::Ellipsis)).count();
        if ellipses > 1 {
            return Err(NetworkError::Indexing(
                "only one ellipsis is allowed".to_string(),
            ));
        }
        let used = key.len() - new_axes - ellipses;
        if used > self.ndim() {
            return Err(NetworkError::Indexing(format!(
                "too many index entries ({}) for a {}-way network",
                used,
                self.ndim()
            )));
        }
        let fill = self.ndim() - used;

        let mut expanded = Vec::with_capacity(key.len() + fill);
        for entry in key {
            if matches!(entry, Index::Ellipsis) {
                expanded.extend(std::iter::repeat(Index::full()).take(fill));
            } else {
                expanded.push(entry.clone());
            }
        }
        if ellipses == 0 {
            expanded.extend(std::iter::repeat(Index::full()).take(fill));
        }
        Ok(expanded)
    }

    /// Index the network without decompressing it.
    ///
    /// # Errors
    ///
    /// Returns `Indexing` for malformed keys (too many entries, several
    /// ellipses, positions out of range, fancy arrays of different lengths or
    /// not contiguous).
    ///
    /// # Examples
    ///
    /// ```
    /// use scirs2_core::ndarray_ext::array;
    /// use tnet_network::{Index, TensorNetwork};
    ///
    /// let t = TensorNetwork::from_cp_factors(vec![
    ///     array![[1.0], [2.0]],
    ///     array![[1.0], [10.0], [100.0]],
    /// ])
    /// .unwrap();
    /// let v = t.get(&[Index::Int(1), Index::Int(2)]).unwrap();
    /// assert_eq!(v.as_scalar(), Some(200.0));
    ///
    /// let row = t.get(&[Index::Int(1)]).unwrap().into_network().unwrap();
    /// assert_eq!(row.shape(), vec![3]);
    /// ```
    pub fn get(&self, key: &[Index]) -> Result<Indexed> {
        let key = self.process_key(key)?;
        let mut walk = KeyWalk::new(self);
        let mut counter = 0;
        let mut last_was_fancy = false;

        for entry in &key {
            match entry {
                Index::NewAxis => walk.new_axis(counter)?,
                Index::Slice(spec) => {
                    walk.slice(counter, spec)?;
                    counter += 1;
                }
                Index::Fancy(positions) => {
                    walk.fancy(counter, positions)?;
                    counter += 1;
                }
                Index::Int(position) => {
                    walk.int(counter, *position, last_was_fancy)?;
                    counter += 1;
                }
                Index::Ellipsis => unreachable!("ellipsis expanded by process_key"),
            }
            last_was_fancy = matches!(entry, Index::Fancy(_));
        }
        walk.finish()
    }

    /// Single entry at `position`.
    pub fn value_at(&self, position: &[usize]) -> Result<f64> {
        if position.len() != self.ndim() {
            return Err(NetworkError::Indexing(format!(
                "{} indices given for a {}-way network",
                position.len(),
                self.ndim()
            )));
        }
        let key: Vec<Index> = position.iter().map(|&i| Index::Int(i)).collect();
        match self.get(&key)? {
            Indexed::Scalar(v) => Ok(v),
            Indexed::Network(_) => Err(NetworkError::Indexing(
                "integer key did not reduce to a scalar".to_string(),
            )),
        }
    }

    /// Select the region described by a mask with exactly one accepted input.
    ///
    /// Each axis label is clipped to {0, 1}; on every axis the positions whose
    /// clipped label equals the accepted symbol become an integer (one
    /// position) or a slice from the first to the last of them.
    pub fn index_by_mask(&self, mask: &TensorNetwork) -> Result<Indexed> {
        if mask.ndim() != self.ndim() {
            return Err(NetworkError::Mask(format!(
                "mask has {} axes, network has {}",
                mask.ndim(),
                self.ndim()
            )));
        }
        let total = mask.sum();
        if (total - 1.0).abs() > MASK_SUM_TOLERANCE {
            return Err(NetworkError::Mask(format!(
                "mask must have exactly one accepted input (entries sum to {})",
                total
            )));
        }
        let accepted = mask.accepted_inputs(Some(2))?;
        if accepted.len() != 1 {
            return Err(NetworkError::Mask(format!(
                "mask must have exactly one accepted input, found {}",
                accepted.len()
            )));
        }
        let symbols = &accepted[0];

        let mut key = Vec::with_capacity(self.ndim());
        for (n, labels) in self.labels.iter().enumerate() {
            let matching: Vec<usize> = labels
                .iter()
                .enumerate()
                .filter(|&(_, &label)| label.min(1) == symbols[n])
                .map(|(p, _)| p)
                .collect();
            key.push(match matching.as_slice() {
                [] => {
                    return Err(NetworkError::Mask(format!(
                        "no position of axis {} carries symbol {}",
                        n, symbols[n]
                    )))
                }
                [single] => Index::Int(*single),
                [first, .., last] => Index::from(*first..*last + 1),
            });
        }
        self.get(&key)
    }

    /// Overwrite the addressed region with a network of matching shape.
    ///
    /// Every key entry must be an integer or a slice. The network is rebuilt as
    /// `self − (self restricted to the region) + (value embedded in the region)`,
    /// so ranks grow; round afterwards if needed. Tucker factors are
    /// decompressed first.
    pub fn assign(&mut self, key: &[Index], value: &TensorNetwork) -> Result<()> {
        let regions = self.assignment_regions(key)?;
        if value.ndim() != self.ndim() {
            return Err(NetworkError::ShapeMismatch(format!(
                "cannot assign a {}-way network into a {}-way network",
                value.ndim(),
                self.ndim()
            )));
        }
        let value = value.decompress_tucker_factors(None)?;
        for (n, (positions, &size)) in regions.iter().zip(value.shape().iter()).enumerate() {
            if positions.len() != size {
                return Err(NetworkError::ShapeMismatch(format!(
                    "axis {} of the assigned region has size {}, value has {}",
                    n,
                    positions.len(),
                    size
                )));
            }
        }

        let base = self.decompress_tucker_factors(None)?;
        let mut added = Vec::with_capacity(base.ndim());
        for (n, positions) in regions.iter().enumerate() {
            let size = base.shape()[n];
            let embedded = match (&base.cores[n], &value.cores[n]) {
                (Core::Cp(_), Core::Cp(v)) => {
                    let mut a = Array2::<f64>::zeros((size, v.ncols()));
                    for (k, &p) in positions.iter().enumerate() {
                        a.row_mut(p).assign(&v.row(k));
                    }
                    Core::Cp(a)
                }
                (target, v) => {
                    if target.is_cp() {
                        warn!("assign: axis {} is promoted from CP to TT", n);
                    }
                    let g = v.to_tt();
                    let (ra, _, rb) = g.dim();
                    let mut out = Array3::<f64>::zeros((ra, size, rb));
                    for (k, &p) in positions.iter().enumerate() {
                        out.index_axis_mut(Axis(1), p).assign(&g.index_axis(Axis(1), k));
                    }
                    Core::Tt(out)
                }
            };
            added.push(embedded);
        }
        let added = TensorNetwork::from_cores(added)?;
        self.replace_region(&base, &regions, &added)
    }

    /// Overwrite the addressed region with a constant.
    pub fn assign_scalar(&mut self, key: &[Index], value: f64) -> Result<()> {
        let regions = self.assignment_regions(key)?;
        let base = self.decompress_tucker_factors(None)?;
        let mut added = Vec::with_capacity(base.ndim());
        for (n, positions) in regions.iter().enumerate() {
            let size = base.shape()[n];
            let fill = if n == 0 { value } else { 1.0 };
            let mut indicator = Array1::<f64>::zeros(size);
            for &p in positions {
                indicator[p] = fill;
            }
            added.push(match &base.cores[n] {
                Core::Cp(_) => Core::Cp(indicator.insert_axis(Axis(1))),
                Core::Tt(_) => Core::Tt(indicator.insert_axis(Axis(1)).insert_axis(Axis(0))),
            });
        }
        let added = TensorNetwork::from_cores(added)?;
        self.replace_region(&base, &regions, &added)
    }

    /// Positions addressed on every axis by an assignment key.
    fn assignment_regions(&self, key: &[Index]) -> Result<Vec<Vec<usize>>> {
        let key = self.process_key(key)?;
        let shape = self.shape();
        key.iter()
            .enumerate()
            .map(|(n, entry)| match entry {
                Index::Int(p) if *p < shape[n] => Ok(vec![*p]),
                Index::Int(p) => Err(NetworkError::Indexing(format!(
                    "index {} out of range for axis {} of size {}",
                    p, n, shape[n]
                ))),
                Index::Slice(spec) => {
                    let positions = spec.resolve(shape[n])?;
                    if positions.is_empty() {
                        return Err(NetworkError::Indexing(format!(
                            "slice {:?} selects nothing on axis {}",
                            spec, n
                        )));
                    }
                    Ok(positions)
                }
                other => Err(NetworkError::Indexing(format!(
                    "assignment keys accept integers and slices only, got {:?}",
                    other
                ))),
            })
            .collect()
    }

    /// `self = base − base|region + added`.
    fn replace_region(
        &mut self,
        base: &TensorNetwork,
        regions: &[Vec<usize>],
        added: &TensorNetwork,
    ) -> Result<()> {
        let mut masked = base.clone();
        for (core, positions) in masked.cores.iter_mut().zip(regions.iter()) {
            let mut keep = vec![false; core.middle_size()];
            for &p in positions {
                keep[p] = true;
            }
            match core {
                Core::Tt(g) => {
                    for (j, mut slab) in g.axis_iter_mut(Axis(1)).enumerate() {
                        if !keep[j] {
                            slab.fill(0.0);
                        }
                    }
                }
                Core::Cp(a) => {
                    for (j, mut row) in a.axis_iter_mut(Axis(0)).enumerate() {
                        if !keep[j] {
                            row.fill(0.0);
                        }
                    }
                }
            }
        }
        let labels = self.labels.clone();
        let updated = base.try_sub(&masked)?.try_add(added)?;
        *self = updated.with_labels(labels)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;
    use tnet_core::DenseND;

    fn three_way() -> TensorNetwork {
        TensorNetwork::from_tt_cores(vec![
            Array3::from_shape_fn((1, 3, 2), |(_, j, k)| 1.0 + j as f64 + 0.5 * k as f64),
            Array3::from_shape_fn((2, 4, 2), |(a, j, b)| (a + j) as f64 - 0.3 * b as f64),
            Array3::from_shape_fn((2, 5, 1), |(a, j, _)| 0.2 * j as f64 - a as f64),
        ])
        .unwrap()
    }

    fn mixed() -> TensorNetwork {
        let u = Array2::from_shape_fn((4, 3), |(i, j)| if i == j { 1.0 } else { 0.25 });
        TensorNetwork::from_cores_with_factors(
            vec![
                Core::Cp(array![[1.0, 2.0], [0.5, -1.0], [3.0, 1.0]]),
                Core::Cp(array![[1.0, 0.0], [2.0, 1.0], [0.0, 1.0]]),
                Core::Tt(Array3::from_shape_fn((2, 2, 1), |(a, j, _)| (a + j) as f64 + 1.0)),
            ],
            vec![None, Some(u), None],
        )
        .unwrap()
    }

    fn dense_at(d: &DenseND<f64>, idx: &[usize]) -> f64 {
        d[idx]
    }

    #[test]
    fn test_slice_resolve() {
        assert_eq!(SliceSpec::new(1, Some(7), 2).resolve(5).unwrap(), vec![1, 3]);
        assert_eq!(SliceSpec::full().resolve(3).unwrap(), vec![0, 1, 2]);
        assert!(SliceSpec::new(0, None, 0).resolve(3).is_err());
    }

    #[test]
    fn test_int_keys_give_scalars() {
        let t = mixed();
        let dense = t.full().unwrap();
        for i in 0..3 {
            for j in 0..4 {
                for k in 0..2 {
                    let v = t.value_at(&[i, j, k]).unwrap();
                    assert!((v - dense_at(&dense, &[i, j, k])).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_middle_int_slice() {
        let t = three_way();
        let dense = t.full().unwrap();
        let sub = t
            .get(&[Index::full(), Index::Int(2), Index::full()])
            .unwrap()
            .into_network()
            .unwrap();
        assert_eq!(sub.shape(), vec![3, 5]);
        let sub_dense = sub.full().unwrap();
        for i in 0..3 {
            for k in 0..5 {
                assert!((sub_dense[&[i, k]] - dense[&[i, 2, k]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_trailing_int_and_ellipsis() {
        let t = mixed();
        let dense = t.full().unwrap();
        let sub = t
            .get(&[Index::Ellipsis, Index::Int(1)])
            .unwrap()
            .into_network()
            .unwrap();
        assert_eq!(sub.shape(), vec![3, 4]);
        let sub_dense = sub.full().unwrap();
        for i in 0..3 {
            for j in 0..4 {
                assert!((sub_dense[&[i, j]] - dense[&[i, j, 1]]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_slices_keep_factors() {
        let t = mixed();
        let dense = t.full().unwrap();
        let sub = t
            .get(&[Index::from(1..3), Index::Slice(SliceSpec::new(0, None, 2))])
            .unwrap()
            .into_network()
            .unwrap();
        assert_eq!(sub.shape(), vec![2, 2, 2]);
        assert!(sub.factors()[1].is_some());
        assert!(sub.cores()[0].is_cp());
        let sub_dense = sub.full().unwrap();
        assert!((sub_dense[&[1, 1, 0]] - dense[&[2, 2, 0]]).abs() < 1e-12);
    }

    #[test]
    fn test_fancy_zips_axes() {
        let t = three_way();
        let dense = t.full().unwrap();
        let picked = t
            .get(&[Index::Fancy(vec![0, 2, 1]), Index::Fancy(vec![3, 0, 1])])
            .unwrap()
            .into_network()
            .unwrap();
        assert_eq!(picked.shape(), vec![3, 5]);
        let picked_dense = picked.full().unwrap();
        for (p, (i, j)) in [(0, 3), (2, 0), (1, 1)].iter().enumerate() {
            for k in 0..5 {
                assert!((picked_dense[&[p, k]] - dense[&[*i, *j, k]]).abs() < 1e-12);
            }
        }

        let columns = Index::fancy_columns(&array![[0, 3], [2, 0], [1, 1]]);
        let again = t.get(&columns).unwrap().into_network().unwrap();
        assert!(again.dist(&picked).unwrap() < 1e-12);
    }

    #[test]
    fn test_new_axis() {
        let t = three_way();
        let expanded = t
            .get(&[Index::full(), Index::NewAxis])
            .unwrap()
            .into_network()
            .unwrap();
        assert_eq!(expanded.shape(), vec![3, 1, 4, 5]);
        assert!((expanded.sum() - t.sum()).abs() < 1e-10);
    }

    #[test]
    fn test_malformed_keys() {
        let t = three_way();
        let too_many = [Index::Int(0), Index::Int(0), Index::Int(0), Index::Int(0)];
        assert!(matches!(t.get(&too_many), Err(NetworkError::Indexing(_))));
        assert!(t.get(&[Index::Ellipsis, Index::Ellipsis]).is_err());
        assert!(t.get(&[Index::Int(3)]).is_err());
        assert!(t.get(&[Index::Fancy(vec![0, 1]), Index::Fancy(vec![0])]).is_err());
        let split = [Index::Fancy(vec![0]), Index::Int(1), Index::Fancy(vec![0])];
        assert!(matches!(t.get(&split), Err(NetworkError::Indexing(_))));
    }

    #[test]
    fn test_index_by_mask() {
        let t = three_way()
            .with_labels(vec![vec![0, 1, 1], vec![0, 0, 1, 0], vec![1, 0, 0, 0, 0]])
            .unwrap();
        let one_hot = |size: usize, p: usize| {
            Array2::from_shape_fn((size, 1), |(i, _)| if i == p { 1.0 } else { 0.0 })
        };
        let mask = TensorNetwork::from_cp_factors(vec![one_hot(3, 1), one_hot(4, 1), one_hot(5, 0)]).unwrap();
        let region = t.index_by_mask(&mask).unwrap().into_network().unwrap();
        // symbols (1, 1, 0): axis 0 → 1..3, axis 1 → Int(2), axis 2 → 1..5
        assert_eq!(region.shape(), vec![2, 4]);
        let dense = t.full().unwrap();
        let region_dense = region.full().unwrap();
        assert!((region_dense[&[0, 0]] - dense[&[1, 2, 1]]).abs() < 1e-12);

        let double = &mask * 2.0;
        assert!(matches!(t.index_by_mask(&double), Err(NetworkError::Mask(_))));
    }

    #[test]
    fn test_assign_scalar() {
        let mut t = mixed();
        let before = t.full().unwrap();
        t.assign_scalar(&[Index::Int(1), Index::from(1..3)], 7.0).unwrap();
        let after = t.full().unwrap();
        for i in 0..3 {
            for j in 0..4 {
                for k in 0..2 {
                    let expected = if i == 1 && (1..3).contains(&j) {
                        7.0
                    } else {
                        before[&[i, j, k]]
                    };
                    assert!((after[&[i, j, k]] - expected).abs() < 1e-10);
                }
            }
        }
    }

    #[test]
    fn test_assign_network() {
        let mut t = three_way();
        let before = t.full().unwrap();
        let value = TensorNetwork::from_cp_factors(vec![
            array![[1.0], [2.0]],
            array![[1.0], [1.0], [1.0], [1.0]],
            array![[3.0], [4.0]],
        ])
        .unwrap();
        let key = [Index::from(1..3), Index::full(), Index::from(..2)];
        t.assign(&key, &value).unwrap();
        let after = t.full().unwrap();
        let value_dense = value.full().unwrap();
        for i in 0..3 {
            for j in 0..4 {
                for k in 0..5 {
                    let expected = if i >= 1 && k < 2 {
                        value_dense[&[i - 1, j, k]]
                    } else {
                        before[&[i, j, k]]
                    };
                    assert!((after[&[i, j, k]] - expected).abs() < 1e-10);
                }
            }
        }

        let wrong = TensorNetwork::from_cp_factors(vec![array![[1.0]], array![[1.0]], array![[1.0]]]).unwrap();
        assert!(matches!(t.assign(&key, &wrong), Err(NetworkError::ShapeMismatch(_))));
        assert!(t.assign(&[Index::NewAxis], &value).is_err());
    }
}
