
use evdev_sys::*;
use libc::input_event;
use nix::errno::Errno;
use std::ffi::CStr;
use std::os::unix::io::RawFd;

type Result<T> = std::result::Result<T, Errno>;

pub struct Device(*mut libevdev);

/// A uinput device together with the descriptor it was created on.
pub struct UInputDevice {
    raw: *mut libevdev_uinput,
    fd: RawFd,
}

pub struct InputEvent(input_event);

#[allow(unused)]
#[repr(i32)]
pub enum ReadFlag {
    Normal = LIBEVDEV_READ_FLAG_NORMAL,
    Sync = LIBEVDEV_READ_FLAG_SYNC,
}

pub enum ReadStatus {
    Success(InputEvent),
    Sync(InputEvent),
    TryAgain,
}

impl Device {
    /// Takes ownership of `fd` only on success.
    pub fn new_from_fd(fd: RawFd) -> Result<Self> {
        let mut raw = std::ptr::null_mut::<libevdev>();
        match unsafe { libevdev_new_from_fd(fd, &mut raw) } {
            0 => Ok(Device(raw)),
            neg_errno => Err(Errno::from_i32(-neg_errno)),
        }
    }

    pub fn fd(&self) -> Option<RawFd> {
        match unsafe { libevdev_get_fd(self.0) } {
            -1 => None,
            fd => Some(fd),
        }
    }

    pub fn name(&self) -> String {
        let ptr = unsafe { libevdev_get_name(self.0) };
        if ptr.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    pub fn grab(&self, grab: bool) -> Result<()> {
        let grabmode = match grab {
            true => LIBEVDEV_GRAB,
            false => LIBEVDEV_UNGRAB,
        };

        match unsafe { libevdev_grab(self.0, grabmode) } {
            0 => Ok(()),
            neg_errno => Err(Errno::from_i32(-neg_errno)),
        }
    }

    pub fn next_event(&self, flag: ReadFlag) -> Result<ReadStatus> {
        const NEG_EAGAIN: i32 = -(Errno::EAGAIN as i32);

        let mut event = InputEvent::zeroed();
        match unsafe { libevdev_next_event(self.0, flag as u32, event.raw_mut()) } {
            LIBEVDEV_READ_STATUS_SUCCESS =>
                Ok(ReadStatus::Success(event)),
            LIBEVDEV_READ_STATUS_SYNC =>
                Ok(ReadStatus::Sync(event)),
            NEG_EAGAIN =>
                Ok(ReadStatus::TryAgain),
            neg_errno =>
                Err(Errno::from_i32(-neg_errno)),
        }
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        let opt_fd = self.fd();
        unsafe { libevdev_free(self.0) };

        if let Some(fd) = opt_fd {
            let _ = nix::unistd::close(fd);
        }
    }
}

impl UInputDevice {
    /// Mirrors the capabilities of `dev` onto a new device created through
    /// `uinput_fd`. The descriptor is owned by the result on success and
    /// left to the caller on failure.
    pub fn create_from_device(dev: &Device, uinput_fd: RawFd) -> Result<Self> {
        let mut raw = std::ptr::null_mut::<libevdev_uinput>();
        match unsafe {
            libevdev_uinput_create_from_device(dev.0, uinput_fd, &mut raw)
        } {
            0 => Ok(Self { raw, fd: uinput_fd }),
            neg_errno => Err(Errno::from_i32(-neg_errno)),
        }
    }

    pub fn devnode(&self) -> Option<String> {
        let ptr = unsafe { libevdev_uinput_get_devnode(self.raw) };
        if ptr.is_null() {
            None
        } else {
            Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
        }
    }

    pub fn write_event(&self, type_: u32, code: u32, value: i32) -> Result<()> {
        match unsafe {
            libevdev_uinput_write_event(self.raw, type_, code, value)
        } {
            0 => Ok(()),
            neg_errno => Err(Errno::from_i32(-neg_errno)),
        }
    }
}

impl Drop for UInputDevice {
    fn drop(&mut self) {
        unsafe { libevdev_uinput_destroy(self.raw) };
        let _ = nix::unistd::close(self.fd);
    }
}

impl InputEvent {
    fn zeroed() -> Self {
        // input_event is plain old data; all-zero is a valid SYN_REPORT.
        InputEvent(unsafe { std::mem::zeroed() })
    }

    pub fn raw_mut(&mut self) -> &mut input_event {
        &mut self.0
    }

    pub fn type_(&self) -> u32 {
        self.0.type_ as u32
    }

    pub fn code(&self) -> u32 {
        self.0.code as u32
    }

    pub fn value(&self) -> i32 {
        self.0.value
    }
}
