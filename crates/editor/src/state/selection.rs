use serde::Serialize;
use shared::{PrimitiveKind, PrimitiveRef};
use tracing::debug;

/// At most this many vertices stay selected; the oldest is evicted first
pub const VERTEX_CAPACITY: usize = 4;

/// Result of toggling one primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Toggle {
    /// True if the primitive is now selected, false if it was removed
    pub added: bool,
    /// Member pushed out to make room
    pub evicted: Option<PrimitiveRef>,
}

/// Persistent selected sets, one per primitive kind, in selection order
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    vertices: Vec<PrimitiveRef>,
    edges: Vec<PrimitiveRef>,
    faces: Vec<PrimitiveRef>,
    /// Bumped on every change
    pub version: u64,
}

impl SelectionSet {
    fn list(&self, kind: PrimitiveKind) -> &Vec<PrimitiveRef> {
        match kind {
            PrimitiveKind::Vertex => &self.vertices,
            PrimitiveKind::Edge => &self.edges,
            PrimitiveKind::Face => &self.faces,
        }
    }

    fn list_mut(&mut self, kind: PrimitiveKind) -> &mut Vec<PrimitiveRef> {
        match kind {
            PrimitiveKind::Vertex => &mut self.vertices,
            PrimitiveKind::Edge => &mut self.edges,
            PrimitiveKind::Face => &mut self.faces,
        }
    }

    fn capacity(kind: PrimitiveKind) -> Option<usize> {
        match kind {
            PrimitiveKind::Vertex => Some(VERTEX_CAPACITY),
            PrimitiveKind::Edge | PrimitiveKind::Face => None,
        }
    }

    /// Add `target` if absent, remove it if present
    pub fn toggle(&mut self, target: PrimitiveRef) -> Toggle {
        self.version += 1;
        let list = self.list_mut(target.kind);

        if let Some(pos) = list.iter().position(|r| *r == target) {
            list.remove(pos);
            return Toggle { added: false, evicted: None };
        }

        let evicted = match Self::capacity(target.kind) {
            Some(cap) if list.len() >= cap => {
                let oldest = list.remove(0);
                debug!(?oldest, "selection full, evicting oldest");
                Some(oldest)
            }
            _ => None,
        };
        list.push(target);
        Toggle { added: true, evicted }
    }

    pub fn contains(&self, target: PrimitiveRef) -> bool {
        self.list(target.kind).contains(&target)
    }

    /// Members of one kind, oldest first
    pub fn members(&self, kind: PrimitiveKind) -> &[PrimitiveRef] {
        self.list(kind)
    }

    pub fn len(&self, kind: PrimitiveKind) -> usize {
        self.list(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        PrimitiveKind::ALL.iter().all(|k| self.list(*k).is_empty())
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.faces.clear();
        self.version += 1;
    }

    /// Re-point every member through `locate`, keeping selection order.
    /// Members it cannot find are dropped and returned.
    pub fn remap(&mut self, locate: impl Fn(PrimitiveRef) -> Option<PrimitiveRef>) -> Vec<PrimitiveRef> {
        let mut pruned = Vec::new();
        let mut changed = false;
        for kind in PrimitiveKind::ALL {
            let list = self.list_mut(kind);
            for r in std::mem::take(list) {
                match locate(r) {
                    Some(next) => {
                        changed |= next != r;
                        list.push(next);
                    }
                    None => pruned.push(r),
                }
            }
        }
        if changed || !pruned.is_empty() {
            self.version += 1;
        }
        pruned
    }
}

/// Primitive currently under the pointer; `None` is the idle state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoverState {
    pub target: Option<PrimitiveRef>,
}

impl HoverState {
    /// Replace the hover; returns the previous target when it changed
    pub fn replace(&mut self, next: Option<PrimitiveRef>) -> Option<Option<PrimitiveRef>> {
        if self.target == next {
            None
        } else {
            Some(std::mem::replace(&mut self.target, next))
        }
    }

    pub fn clear(&mut self) -> Option<PrimitiveRef> {
        self.target.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::FaceLabel;

    #[test]
    fn test_initial_empty() {
        let s = SelectionSet::default();
        assert!(s.is_empty());
        assert_eq!(s.len(PrimitiveKind::Vertex), 0);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut s = SelectionSet::default();
        let e = PrimitiveRef::edge(3);
        assert!(s.toggle(e).added);
        assert!(s.contains(e));
        assert!(!s.toggle(e).added);
        assert!(!s.contains(e));
        assert!(s.is_empty());
    }

    #[test]
    fn test_vertex_fifo_eviction() {
        let mut s = SelectionSet::default();
        for i in 0..4 {
            assert_eq!(s.toggle(PrimitiveRef::vertex(i)).evicted, None);
        }
        let t = s.toggle(PrimitiveRef::vertex(9));
        assert_eq!(t.evicted, Some(PrimitiveRef::vertex(0)));
        let members: Vec<usize> = s.members(PrimitiveKind::Vertex).iter().map(|r| r.index).collect();
        assert_eq!(members, vec![1, 2, 3, 9]);
    }

    #[test]
    fn test_faces_unbounded() {
        let mut s = SelectionSet::default();
        for face in FaceLabel::ALL {
            assert_eq!(s.toggle(PrimitiveRef::face(face)).evicted, None);
        }
        assert_eq!(s.len(PrimitiveKind::Face), 6);
    }

    #[test]
    fn test_remap_keeps_order_and_prunes() {
        let mut s = SelectionSet::default();
        for i in [3, 1, 2] {
            s.toggle(PrimitiveRef::vertex(i));
        }
        s.toggle(PrimitiveRef::edge(9));
        let version = s.version;

        let pruned = s.remap(|r| match (r.kind, r.index) {
            (PrimitiveKind::Vertex, 1) => None,
            (kind, index) => Some(PrimitiveRef { kind, index: index + 10 }),
        });
        assert_eq!(pruned, vec![PrimitiveRef::vertex(1)]);
        let members: Vec<usize> = s.members(PrimitiveKind::Vertex).iter().map(|r| r.index).collect();
        assert_eq!(members, vec![13, 12]);
        assert!(s.contains(PrimitiveRef::edge(19)));
        assert!(s.version > version);
    }

    #[test]
    fn test_remap_identity_is_silent() {
        let mut s = SelectionSet::default();
        s.toggle(PrimitiveRef::face(FaceLabel::Top));
        let version = s.version;
        assert!(s.remap(Some).is_empty());
        assert_eq!(s.version, version);
    }

    #[test]
    fn test_hover_replace() {
        let mut h = HoverState::default();
        assert_eq!(h.replace(Some(PrimitiveRef::edge(1))), Some(None));
        assert_eq!(h.replace(Some(PrimitiveRef::edge(1))), None);
        assert_eq!(h.replace(None), Some(Some(PrimitiveRef::edge(1))));
    }
}
