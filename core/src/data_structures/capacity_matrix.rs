//! Dense capacity matrix for small flow networks
//!
//! Cell (i, j) holds the residual capacity of the directed edge i -> j,
//! zero meaning "no edge" or "no residual capacity left". Storage is a
//! single row-major vector; node 0 is the source and node N-1 the sink.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::{self, Debug, Display};
use std::ops::Index;
use std::str::FromStr;

use num_traits::{CheckedAdd, CheckedSub, NumAssign, Signed};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::algorithm::traits::{FlowError, NodeId};
use crate::data_structures::edge_list::Edge;

/// Numeric type usable as an edge capacity.
///
/// Signed so that `original - residual` can express flow routed through
/// the reverse side of an edge. Integers compare exactly and report
/// overflow; floats compare within a relative tolerance and report
/// non-finite results.
pub trait Capacity:
    NumAssign
    + Signed
    + Copy
    + PartialOrd
    + Debug
    + Display
    + FromStr
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// Equality up to accumulated rounding error
    fn approx_eq(self, other: Self) -> bool;

    /// `self + rhs`, `None` when the sum is not representable
    fn checked_sum(self, rhs: Self) -> Option<Self>;

    /// `self - rhs`, `None` when the difference is not representable
    fn checked_diff(self, rhs: Self) -> Option<Self>;
}

macro_rules! exact_capacity {
    ($($t:ty),*) => {$(
        impl Capacity for $t {
            #[inline]
            fn approx_eq(self, other: Self) -> bool {
                self == other
            }

            #[inline]
            fn checked_sum(self, rhs: Self) -> Option<Self> {
                CheckedAdd::checked_add(&self, &rhs)
            }

            #[inline]
            fn checked_diff(self, rhs: Self) -> Option<Self> {
                CheckedSub::checked_sub(&self, &rhs)
            }
        }
    )*};
}

macro_rules! float_capacity {
    ($($t:ty => $tolerance:expr),*) => {$(
        impl Capacity for $t {
            #[inline]
            fn approx_eq(self, other: Self) -> bool {
                let scale = self.abs().max(other.abs()).max(1.0);
                (self - other).abs() <= $tolerance * scale
            }

            #[inline]
            fn checked_sum(self, rhs: Self) -> Option<Self> {
                Some(self + rhs).filter(|value| value.is_finite())
            }

            #[inline]
            fn checked_diff(self, rhs: Self) -> Option<Self> {
                Some(self - rhs).filter(|value| value.is_finite())
            }
        }
    )*};
}

exact_capacity!(i8, i16, i32, i64, i128, isize);
float_capacity!(f32 => 1e-4, f64 => 1e-9);

/// Rejects negative values (and NaN for floating capacities)
#[inline]
pub(crate) fn is_valid_capacity<C: Capacity>(value: C) -> bool {
    value >= C::zero()
}

/// Square matrix of residual capacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<C>>", into = "Vec<Vec<C>>")]
#[serde(bound(serialize = "C: Capacity", deserialize = "C: Capacity"))]
pub struct CapacityMatrix<C> {
    nodes: usize,
    cells: Vec<C>,
}

impl<C: Capacity> CapacityMatrix<C> {
    /// Creates an all-zero matrix for `nodes` nodes
    pub fn new(nodes: usize) -> Self {
        Self {
            nodes,
            cells: vec![C::zero(); nodes * nodes],
        }
    }

    /// Builds a matrix from explicit rows, validating shape and values
    pub fn from_rows(rows: Vec<Vec<C>>) -> Result<Self, FlowError> {
        let nodes = rows.len();
        let mut cells = Vec::with_capacity(nodes * nodes);

        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != nodes {
                return Err(FlowError::NonSquareMatrix {
                    row: row_index,
                    len: row.len(),
                    expected: nodes,
                });
            }
            for (column, value) in row.into_iter().enumerate() {
                if !is_valid_capacity(value) {
                    return Err(FlowError::NegativeCapacity {
                        from: row_index,
                        to: column,
                        capacity: value.to_string(),
                    });
                }
                cells.push(value);
            }
        }

        Ok(Self { nodes, cells })
    }

    /// Builds a matrix from edge triples.
    ///
    /// Later edges for the same ordered pair overwrite earlier ones;
    /// duplicates are not summed.
    pub fn from_edges<I>(nodes: usize, edges: I) -> Result<Self, FlowError>
    where
        I: IntoIterator<Item = Edge<C>>,
    {
        let mut matrix = Self::new(nodes);

        for edge in edges {
            for node in [edge.from, edge.to] {
                if node >= nodes {
                    return Err(FlowError::NodeOutOfRange { node, nodes });
                }
            }
            if !is_valid_capacity(edge.capacity) {
                return Err(FlowError::NegativeCapacity {
                    from: edge.from,
                    to: edge.to,
                    capacity: edge.capacity.to_string(),
                });
            }
            matrix.set(edge.from, edge.to, edge.capacity);
        }

        Ok(matrix)
    }

    /// Parses an edge-list description and builds the matrix
    pub fn from_edge_list(text: &str, nodes: usize) -> Result<Self, FlowError> {
        let edges = crate::data_structures::edge_list::parse_edge_list(text)?;
        Self::from_edges(nodes, edges)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes == 0
    }

    #[inline]
    pub fn get(&self, from: NodeId, to: NodeId) -> C {
        self.cells[from * self.nodes + to]
    }

    #[inline]
    pub(crate) fn set(&mut self, from: NodeId, to: NodeId, value: C) {
        self.cells[from * self.nodes + to] = value;
    }

    /// Outgoing capacities of `node`, indexed by target
    pub fn row(&self, node: NodeId) -> &[C] {
        let start = node * self.nodes;
        &self.cells[start..start + self.nodes]
    }

    /// Edges with positive capacity in row-major (ascending) order
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, C)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &value)| value > C::zero())
            .map(move |(index, &value)| (index / self.nodes, index % self.nodes, value))
    }

    /// Moves `amount` of residual capacity from `from -> to` onto `to -> from`.
    ///
    /// Leaves the matrix untouched when either cell would overflow.
    pub(crate) fn transfer(&mut self, from: NodeId, to: NodeId, amount: C) -> Result<(), FlowError> {
        let forward = from * self.nodes + to;
        let backward = to * self.nodes + from;
        let remaining = self.cells[forward]
            .checked_diff(amount)
            .ok_or_else(|| FlowError::CapacityOverflow(format!("residual {from} -> {to}")))?;
        let reverse = self.cells[backward]
            .checked_sum(amount)
            .ok_or_else(|| FlowError::CapacityOverflow(format!("residual {to} -> {from}")))?;
        self.cells[forward] = remaining;
        self.cells[backward] = reverse;
        Ok(())
    }

    /// Entrywise `self - other`
    pub fn difference(&self, other: &Self) -> Result<Self, FlowError> {
        if self.nodes != other.nodes {
            return Err(FlowError::DimensionMismatch {
                left: self.nodes,
                right: other.nodes,
            });
        }
        let cells = self
            .cells
            .iter()
            .zip(&other.cells)
            .map(|(&left, &right)| {
                left.checked_diff(right)
                    .ok_or_else(|| FlowError::CapacityOverflow(format!("{left} - {right}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { nodes: self.nodes, cells })
    }

    /// Copy with every negative entry replaced by zero
    pub fn positive_part(&self) -> Self {
        let cells = self
            .cells
            .iter()
            .map(|&value| if value > C::zero() { value } else { C::zero() })
            .collect();
        Self { nodes: self.nodes, cells }
    }

    /// Sum of a row
    pub fn row_sum(&self, node: NodeId) -> Result<C, FlowError> {
        self.row(node).iter().try_fold(C::zero(), |acc, &value| {
            acc.checked_sum(value)
                .ok_or_else(|| FlowError::CapacityOverflow(format!("sum of row {node}")))
        })
    }

    pub fn to_rows(&self) -> Vec<Vec<C>> {
        (0..self.nodes).map(|node| self.row(node).to_vec()).collect()
    }
}

impl<C: Capacity> Index<(NodeId, NodeId)> for CapacityMatrix<C> {
    type Output = C;

    fn index(&self, (from, to): (NodeId, NodeId)) -> &C {
        &self.cells[from * self.nodes + to]
    }
}

impl<C: Capacity> TryFrom<Vec<Vec<C>>> for CapacityMatrix<C> {
    type Error = FlowError;

    fn try_from(rows: Vec<Vec<C>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl<C: Capacity> From<CapacityMatrix<C>> for Vec<Vec<C>> {
    fn from(matrix: CapacityMatrix<C>) -> Self {
        matrix.to_rows()
    }
}

impl<C: Capacity> Display for CapacityMatrix<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<Vec<String>> = self
            .to_rows()
            .iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect();
        let width = rendered
            .iter()
            .flatten()
            .map(|cell| cell.len())
            .max()
            .unwrap_or(1);

        write!(f, "[")?;
        for (index, row) in rendered.iter().enumerate() {
            if index > 0 {
                write!(f, "\n ")?;
            }
            let cells: Vec<String> = row.iter().map(|cell| format!("{cell:>width$}")).collect();
            write!(f, "[{}]", cells.join(" "))?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: usize, to: usize, capacity: i64) -> Edge<i64> {
        Edge { from, to, capacity }
    }

    #[test]
    fn test_from_edges_sets_cells() {
        let matrix = CapacityMatrix::from_edges(3, vec![edge(0, 1, 4), edge(1, 2, 6)]).unwrap();
        assert_eq!(matrix.node_count(), 3);
        assert_eq!(matrix.get(0, 1), 4);
        assert_eq!(matrix[(1, 2)], 6);
        assert_eq!(matrix.get(2, 1), 0);
    }

    #[test]
    fn test_duplicate_edges_overwrite() {
        let matrix = CapacityMatrix::from_edges(2, vec![edge(0, 1, 4), edge(0, 1, 9)]).unwrap();
        assert_eq!(matrix.get(0, 1), 9);
    }

    #[test]
    fn test_out_of_range_node_rejected() {
        let err = CapacityMatrix::from_edges(3, vec![edge(0, 3, 1)]).unwrap_err();
        assert!(matches!(err, FlowError::NodeOutOfRange { node: 3, nodes: 3 }));
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let err = CapacityMatrix::from_edges(3, vec![edge(0, 1, -2)]).unwrap_err();
        assert!(matches!(err, FlowError::NegativeCapacity { from: 0, to: 1, .. }));
    }

    #[test]
    fn test_nan_capacity_rejected() {
        let err = CapacityMatrix::from_rows(vec![vec![0.0, f64::NAN], vec![0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, FlowError::NegativeCapacity { .. }));
    }

    #[test]
    fn test_from_rows_requires_square() {
        let err = CapacityMatrix::from_rows(vec![vec![0, 1], vec![0]]).unwrap_err();
        assert!(matches!(err, FlowError::NonSquareMatrix { row: 1, len: 1, expected: 2 }));
    }

    #[test]
    fn test_edges_iterate_in_row_major_order() {
        let matrix = CapacityMatrix::from_rows(vec![
            vec![0, 2, 1],
            vec![0, 0, 5],
            vec![3, 0, 0],
        ])
        .unwrap();
        let edges: Vec<_> = matrix.edges().collect();
        assert_eq!(edges, vec![(0, 1, 2), (0, 2, 1), (1, 2, 5), (2, 0, 3)]);
    }

    #[test]
    fn test_transfer_moves_capacity_to_reverse_cell() {
        let mut matrix = CapacityMatrix::from_rows(vec![vec![0, 5], vec![0, 0]]).unwrap();
        matrix.transfer(0, 1, 3).unwrap();
        assert_eq!(matrix.get(0, 1), 2);
        assert_eq!(matrix.get(1, 0), 3);
    }

    #[test]
    fn test_difference_and_positive_part() {
        let original = CapacityMatrix::from_rows(vec![vec![0, 5], vec![0, 0]]).unwrap();
        let residual = CapacityMatrix::from_rows(vec![vec![0, 1], vec![4, 0]]).unwrap();
        let delta = original.difference(&residual).unwrap();
        assert_eq!(delta.to_rows(), vec![vec![0, 4], vec![-4, 0]]);
        assert_eq!(delta.positive_part().to_rows(), vec![vec![0, 4], vec![0, 0]]);
        assert_eq!(delta.row_sum(0).unwrap(), 4);

        let other = CapacityMatrix::<i64>::new(3);
        assert!(matches!(
            original.difference(&other),
            Err(FlowError::DimensionMismatch { left: 2, right: 3 })
        ));
    }

    #[test]
    fn test_serde_uses_rows() {
        let matrix = CapacityMatrix::from_rows(vec![vec![0, 7], vec![0, 0]]).unwrap();
        let json = serde_json::to_string(&matrix).unwrap();
        assert_eq!(json, "[[0,7],[0,0]]");

        let decoded: CapacityMatrix<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, matrix);
        assert!(serde_json::from_str::<CapacityMatrix<i64>>("[[0,-1],[0,0]]").is_err());
    }

    #[test]
    fn test_transfer_overflow_leaves_matrix_untouched() {
        let mut matrix = CapacityMatrix::from_rows(vec![vec![0, i64::MAX], vec![i64::MAX, 0]]).unwrap();
        let err = matrix.transfer(0, 1, i64::MAX).unwrap_err();
        assert!(matches!(err, FlowError::CapacityOverflow(ref context) if context == "residual 1 -> 0"));
        assert_eq!(matrix.get(0, 1), i64::MAX);
        assert_eq!(matrix.get(1, 0), i64::MAX);
    }

    #[test]
    fn test_row_sum_overflow() {
        let matrix = CapacityMatrix::from_rows(vec![vec![0, i64::MAX, 1], vec![0; 3], vec![0; 3]]).unwrap();
        assert!(matches!(matrix.row_sum(0), Err(FlowError::CapacityOverflow(_))));
        assert_eq!(matrix.row_sum(1).unwrap(), 0);
    }

    #[test]
    fn test_capacity_comparison() {
        assert!(3i64.approx_eq(3));
        assert!(!3i64.approx_eq(4));
        assert!((0.1f64 + 0.2).approx_eq(0.3));
        assert!(!(0.1f64 + 0.2).approx_eq(0.31));
        assert!((1e12f64 + 1e-3).approx_eq(1e12));
        assert!((0.1f32 + 0.2).approx_eq(0.3));
        assert_eq!(i64::MAX.checked_sum(1), None);
        assert_eq!(i64::MIN.checked_diff(1), None);
        assert_eq!(f64::MAX.checked_sum(f64::MAX), None);
        assert_eq!(1.5f64.checked_diff(0.5), Some(1.0));
    }

    #[test]
    fn test_display_aligns_columns() {
        let mut matrix = CapacityMatrix::<i64>::new(2);
        matrix.set(0, 1, 10);
        matrix.set(1, 0, -3);
        assert_eq!(matrix.to_string(), "[[ 0 10]\n [-3  0]]");
    }
}
