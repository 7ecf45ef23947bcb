use std::ops::Index;

/// Fixed-capacity table of registered devices.
///
/// Slots are filled in registration order and never reused, so a device's
/// index is its identity for the rest of the program.
#[derive(Debug)]
pub struct DeviceTable<D, const N: usize> {
    devices: heapless::Vec<D, N>,
}

impl<D, const N: usize> Default for DeviceTable<D, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, const N: usize> DeviceTable<D, N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "device table capacity must be at least 1") };
        Self {
            devices: heapless::Vec::new(),
        }
    }
    pub const fn capacity(&self) -> usize {
        N
    }
    pub fn len(&self) -> usize {
        self.devices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
    pub fn is_full(&self) -> bool {
        self.devices.is_full()
    }
    /// Append a device. Hands the device back when every slot is taken.
    pub fn register(&mut self, device: D) -> Result<usize, D> {
        let index = self.devices.len();
        self.devices.push(device)?;
        Ok(index)
    }
    pub fn get(&self, index: usize) -> Option<&D> {
        self.devices.get(index)
    }
    pub fn get_mut(&mut self, index: usize) -> Option<&mut D> {
        self.devices.get_mut(index)
    }
    pub fn iter(&self) -> std::slice::Iter<'_, D> {
        self.devices.iter()
    }
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, D> {
        self.devices.iter_mut()
    }
    pub fn as_slice(&self) -> &[D] {
        &self.devices
    }
}

impl<D, const N: usize> Index<usize> for DeviceTable<D, N> {
    type Output = D;
    fn index(&self, index: usize) -> &D {
        &self.devices[index]
    }
}

impl<'a, D, const N: usize> IntoIterator for &'a DeviceTable<D, N> {
    type Item = &'a D;
    type IntoIter = std::slice::Iter<'a, D>;
    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
