use super::object::ScriptObject;

/// Script objects laid out as one array of fixed-stride elements, the way
/// legacy scripts see `character[]`, `gui[]` and friends.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable {
    stride: u32,
    objects: Vec<ScriptObject>,
}

impl ObjectTable {
    pub fn new(stride: u32, objects: Vec<ScriptObject>) -> Self {
        Self { stride, objects }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScriptObject> {
        self.objects.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScriptObject> {
        self.objects.iter()
    }

    /// Map a byte offset into the array to the element it falls in and the
    /// offset within that element. `None` past the last element.
    pub fn resolve(&self, offset: u32) -> Option<(ScriptObject, u32)> {
        if self.stride == 0 {
            return None;
        }
        let index = (offset / self.stride) as usize;
        let object = self.objects.get(index)?;
        Some((object.clone(), offset % self.stride))
    }

    /// Byte offset of an element's first field.
    pub fn offset_of(&self, index: usize) -> Option<u32> {
        (index < self.objects.len()).then(|| index as u32 * self.stride)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use ags_formats::game::character::offsets;
    use ags_formats::game::CharacterInfo;

    use super::*;
    use crate::script::object::ScriptEntity;
    use crate::script::ScriptValue;

    fn characters(count: usize) -> ObjectTable {
        let objects = (0..count)
            .map(|index| {
                ScriptObject::new(
                    index,
                    ScriptEntity::Character(RefCell::new(CharacterInfo {
                        x: index as i32 * 10,
                        ..CharacterInfo::default()
                    })),
                )
            })
            .collect();
        ObjectTable::new(780, objects)
    }

    #[test]
    fn offsets_inside_the_array_map_to_element_and_residual() {
        let table = characters(3);
        let stride = table.stride();
        for offset in (0..3 * stride).step_by(97) {
            let (object, residual) = table.resolve(offset).unwrap();
            assert_eq!(object.id(), (offset / stride) as usize);
            assert_eq!(residual, offset % stride);
        }
        let (object, residual) = table.resolve(stride * 2 + offsets::X).unwrap();
        assert_eq!(residual, offsets::X);
        assert_eq!(object.read_field(residual).unwrap(), ScriptValue::Int(20));
    }

    #[test]
    fn offsets_past_the_end_resolve_to_nothing() {
        let table = characters(3);
        assert!(table.resolve(3 * 780).is_none());
        assert!(table.resolve(u32::MAX).is_none());
        assert!(characters(0).resolve(0).is_none());
        assert_eq!(table.offset_of(2), Some(1560));
        assert_eq!(table.offset_of(3), None);
    }
}
