/// Highest volume a voice or the master attenuation can hold
pub const MAX_VOLUME: u8 = 64;

#[inline(always)]
pub fn clamp_up(value: &mut u8, limit: u8) {
    if *value > limit {
        *value = limit;
    }
}

#[inline(always)]
pub fn clamp_volume(value: i32) -> u8 {
    value.clamp(0, MAX_VOLUME as i32) as u8
}

#[inline(always)]
pub fn add_volume(value: &mut u8, add: u8) {
    *value = value.saturating_add(add);
    clamp_up(value, MAX_VOLUME);
}

#[inline(always)]
pub fn sub_volume(value: &mut u8, sub: u8) {
    *value = value.saturating_sub(sub);
}
